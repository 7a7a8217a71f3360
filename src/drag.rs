//! Drag session controller.
//!
//! Turns the three pointer events of a card drag into column assignment
//! mutations:
//!
//! - drag-start records the dragged task and touches nothing else
//! - drag-over moves the card into another column while it hovers there
//! - drag-end settles the drop (reorder within a column, or append to a
//!   column dropped on directly)
//!
//! Every lookup is total. A miss is reported as [`DragOutcome::Ignored`]
//! and leaves the board untouched.

use serde::Serialize;

use crate::assignments::Placement;
use crate::board::Board;
use crate::column::ColumnId;
use crate::task::Task;

/// Why a drag event did not change the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Pointer was not over any drop target.
    NoTarget,
    /// Card was dropped on itself.
    OverSelf,
    /// Dragged id is not on the board.
    UnknownTask,
    /// Target id is neither a column nor a placed task.
    UnknownTarget,
    /// Hovering within the card's own column.
    SameColumn,
    /// Drop in another task's column; the hover state stands.
    CrossColumnDrop,
}

/// What a drag event did to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragOutcome {
    Ignored {
        reason: IgnoreReason,
    },
    MovedAcross {
        from: ColumnId,
        to: ColumnId,
        index: usize,
    },
    Reordered {
        column: ColumnId,
        from: usize,
        to: usize,
    },
    AppendedToColumn {
        from: ColumnId,
        to: ColumnId,
        index: usize,
    },
}

impl DragOutcome {
    fn ignored(reason: IgnoreReason) -> Self {
        DragOutcome::Ignored { reason }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, DragOutcome::Ignored { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            DragOutcome::Ignored { reason } => format!("ignored ({reason:?})"),
            DragOutcome::MovedAcross { from, to, index } => {
                format!("moved from {from} to {to} at position {}", index + 1)
            }
            DragOutcome::Reordered { column, from, to } => {
                format!("reordered in {column} from position {} to {}", from + 1, to + 1)
            }
            DragOutcome::AppendedToColumn { from, to, index } => {
                format!("dropped from {from} onto {to} at position {}", index + 1)
            }
        }
    }
}

/// Drop target named by an over id.
enum Target {
    Column(ColumnId),
    Task(ColumnId, usize),
}

// A column id wins over a task that happens to share its name.
fn resolve_target(board: &Board, over_id: &str) -> Option<Target> {
    if let Some(column) = ColumnId::from_id(over_id) {
        return Some(Target::Column(column));
    }
    let placement = board.placement(over_id)?;
    Some(Target::Task(placement.column, placement.index))
}

/// One full pointer gesture, as reported by [`DragSession::gesture`].
#[derive(Debug, Clone, Serialize)]
pub struct GestureReport {
    pub task_id: String,
    pub over_id: Option<String>,
    pub started: bool,
    pub over: Option<DragOutcome>,
    pub end: DragOutcome,
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, Default)]
pub struct DragSession {
    active: Option<Task>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the task being dragged, if any.
    pub fn active(&self) -> Option<&Task> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn drag_start(&mut self, board: &Board, task_id: &str) -> Option<&Task> {
        self.active = board.task(task_id).cloned();
        tracing::debug!(task_id, found = self.active.is_some(), "drag start");
        self.active.as_ref()
    }

    /// Live cross-column move while the card hovers over `over_id`.
    pub fn drag_over(&mut self, board: &mut Board, active_id: &str, over_id: Option<&str>) -> DragOutcome {
        let outcome = Self::apply_over(board, active_id, over_id);
        tracing::debug!(active_id, over_id, outcome = ?outcome, "drag over");
        outcome
    }

    /// Settle the drop. The active subject is cleared whatever happens.
    pub fn drag_end(&mut self, board: &mut Board, active_id: &str, over_id: Option<&str>) -> DragOutcome {
        self.active = None;
        let outcome = Self::apply_end(board, active_id, over_id);
        tracing::debug!(active_id, over_id, outcome = ?outcome, "drag end");
        outcome
    }

    /// Run start, over and end as a single gesture. `skip_over` models a
    /// gesture fast enough that no drag-over event fired.
    pub fn gesture(
        &mut self,
        board: &mut Board,
        active_id: &str,
        over_id: Option<&str>,
        skip_over: bool,
    ) -> GestureReport {
        let started = self.drag_start(board, active_id).is_some();
        let over = (!skip_over).then(|| self.drag_over(board, active_id, over_id));
        let end = self.drag_end(board, active_id, over_id);
        GestureReport {
            task_id: active_id.to_string(),
            over_id: over_id.map(str::to_string),
            started,
            over,
            end,
            placement: board.placement(active_id),
        }
    }

    fn apply_over(board: &mut Board, active_id: &str, over_id: Option<&str>) -> DragOutcome {
        let Some(over_id) = over_id else {
            return DragOutcome::ignored(IgnoreReason::NoTarget);
        };
        if over_id == active_id {
            return DragOutcome::ignored(IgnoreReason::OverSelf);
        }
        let Some(from) = board.assignments().column_of(active_id) else {
            return DragOutcome::ignored(IgnoreReason::UnknownTask);
        };
        let (to, index) = match resolve_target(board, over_id) {
            Some(Target::Column(column)) => (column, None),
            Some(Target::Task(column, index)) => (column, Some(index)),
            None => return DragOutcome::ignored(IgnoreReason::UnknownTarget),
        };
        if from == to {
            return DragOutcome::ignored(IgnoreReason::SameColumn);
        }
        match board.assignments_mut().move_to(active_id, to, index) {
            Some(placed) => DragOutcome::MovedAcross {
                from,
                to,
                index: placed.index,
            },
            None => DragOutcome::ignored(IgnoreReason::UnknownTask),
        }
    }

    fn apply_end(board: &mut Board, active_id: &str, over_id: Option<&str>) -> DragOutcome {
        let Some(over_id) = over_id else {
            return DragOutcome::ignored(IgnoreReason::NoTarget);
        };
        if over_id == active_id {
            return DragOutcome::ignored(IgnoreReason::OverSelf);
        }
        let Some(current) = board.placement(active_id) else {
            return DragOutcome::ignored(IgnoreReason::UnknownTask);
        };
        match resolve_target(board, over_id) {
            Some(Target::Column(to)) => match board.assignments_mut().move_to(active_id, to, None) {
                Some(placed) => DragOutcome::AppendedToColumn {
                    from: current.column,
                    to,
                    index: placed.index,
                },
                None => DragOutcome::ignored(IgnoreReason::UnknownTask),
            },
            Some(Target::Task(column, to)) if column == current.column => {
                board
                    .assignments_mut()
                    .reorder(column, current.index, to);
                DragOutcome::Reordered {
                    column,
                    from: current.index,
                    to,
                }
            }
            Some(Target::Task(..)) => DragOutcome::ignored(IgnoreReason::CrossColumnDrop),
            None => DragOutcome::ignored(IgnoreReason::UnknownTarget),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskFields;

    fn board_with(layout: &[(ColumnId, &[&str])]) -> Board {
        let mut board = Board::default();
        for (column, task_ids) in layout {
            for id in *task_ids {
                board
                    .place_task(*column, Task::new(*id, TaskFields::new(*id)))
                    .expect("place");
            }
        }
        board
    }

    fn ids(board: &Board, column: ColumnId) -> Vec<&str> {
        board
            .assignments()
            .sequence(column)
            .iter()
            .map(String::as_str)
            .collect()
    }

    #[test]
    fn drag_start_records_copy_without_mutation() {
        let board = board_with(&[(ColumnId::Todo, &["a"])]);
        let before = board.assignments().clone();
        let mut session = DragSession::new();
        assert_eq!(session.drag_start(&board, "a").map(|t| t.id.as_str()), Some("a"));
        assert!(session.is_dragging());
        assert_eq!(board.assignments(), &before);

        assert!(session.drag_start(&board, "missing").is_none());
        assert!(!session.is_dragging());
    }

    #[test]
    fn drag_over_other_column_inserts_at_hovered_task() {
        let mut board = board_with(&[(ColumnId::Todo, &["a", "b"]), (ColumnId::Done, &["x", "y"])]);
        let mut session = DragSession::new();
        let outcome = session.drag_over(&mut board, "a", Some("y"));
        assert_eq!(
            outcome,
            DragOutcome::MovedAcross {
                from: ColumnId::Todo,
                to: ColumnId::Done,
                index: 1
            }
        );
        assert_eq!(ids(&board, ColumnId::Done), vec!["x", "a", "y"]);
        assert_eq!(ids(&board, ColumnId::Todo), vec!["b"]);
    }

    #[test]
    fn drag_over_column_appends() {
        let mut board = board_with(&[(ColumnId::Todo, &["a"]), (ColumnId::Done, &["x"])]);
        let mut session = DragSession::new();
        session.drag_over(&mut board, "a", Some("done"));
        assert_eq!(ids(&board, ColumnId::Done), vec!["x", "a"]);
    }

    #[test]
    fn drag_over_same_column_and_misses_are_ignored() {
        let mut board = board_with(&[(ColumnId::Todo, &["a", "b"])]);
        let before = board.assignments().clone();
        let mut session = DragSession::new();
        for (over, reason) in [
            (Some("b"), IgnoreReason::SameColumn),
            (Some("todo"), IgnoreReason::SameColumn),
            (Some("a"), IgnoreReason::OverSelf),
            (Some("ghost"), IgnoreReason::UnknownTarget),
            (None, IgnoreReason::NoTarget),
        ] {
            assert_eq!(
                session.drag_over(&mut board, "a", over),
                DragOutcome::Ignored { reason }
            );
        }
        assert_eq!(
            session.drag_over(&mut board, "ghost", Some("a")),
            DragOutcome::Ignored {
                reason: IgnoreReason::UnknownTask
            }
        );
        assert_eq!(board.assignments(), &before);
    }

    #[test]
    fn drag_end_reorders_within_column() {
        let mut board = board_with(&[(ColumnId::Todo, &["a", "b", "c"])]);
        let mut session = DragSession::new();
        session.drag_start(&board, "c");
        let outcome = session.drag_end(&mut board, "c", Some("a"));
        assert_eq!(
            outcome,
            DragOutcome::Reordered {
                column: ColumnId::Todo,
                from: 2,
                to: 0
            }
        );
        assert_eq!(ids(&board, ColumnId::Todo), vec!["c", "a", "b"]);
        assert!(!session.is_dragging());
    }

    #[test]
    fn drag_end_on_column_always_appends() {
        let mut board = board_with(&[(ColumnId::Todo, &["a", "b", "c"])]);
        let mut session = DragSession::new();
        let outcome = session.drag_end(&mut board, "a", Some("todo"));
        assert_eq!(
            outcome,
            DragOutcome::AppendedToColumn {
                from: ColumnId::Todo,
                to: ColumnId::Todo,
                index: 2
            }
        );
        assert_eq!(ids(&board, ColumnId::Todo), vec!["b", "c", "a"]);
    }

    #[test]
    fn drag_end_outside_only_clears_subject() {
        let mut board = board_with(&[(ColumnId::Todo, &["a"])]);
        let before = board.assignments().clone();
        let mut session = DragSession::new();
        session.drag_start(&board, "a");
        assert!(session.drag_end(&mut board, "a", None).is_ignored());
        assert!(session.active().is_none());
        assert_eq!(board.assignments(), &before);
    }

    #[test]
    fn fast_cross_column_gesture_keeps_board() {
        let mut board = board_with(&[(ColumnId::Todo, &["a"]), (ColumnId::Done, &["x"])]);
        let mut session = DragSession::new();
        let report = session.gesture(&mut board, "a", Some("x"), true);
        assert!(report.over.is_none());
        assert_eq!(
            report.end,
            DragOutcome::Ignored {
                reason: IgnoreReason::CrossColumnDrop
            }
        );
        assert_eq!(ids(&board, ColumnId::Todo), vec!["a"]);
    }

    #[test]
    fn full_gesture_onto_task_in_other_column() {
        let mut board = board_with(&[(ColumnId::Todo, &["a"]), (ColumnId::Done, &["x", "y"])]);
        let mut session = DragSession::new();
        let report = session.gesture(&mut board, "a", Some("x"), false);
        assert!(report.started);
        assert!(matches!(report.over, Some(DragOutcome::MovedAcross { .. })));
        // After drag-over, a sits where x was and x follows; the drop reorders onto x.
        assert_eq!(
            report.end,
            DragOutcome::Reordered {
                column: ColumnId::Done,
                from: 0,
                to: 1
            }
        );
        assert_eq!(ids(&board, ColumnId::Done), vec!["x", "a", "y"]);
        board.check_invariants().expect("invariants");
    }
}
