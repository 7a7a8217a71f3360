//! Board state: the task store and the column assignment map behind one
//! single-writer handle.
//!
//! Every operation that touches both structures lives here so that the
//! placement invariants hold after each call:
//! - every stored task is in exactly one column
//! - columns hold only stored task ids
//!
//! Lookups that miss are no-ops, never errors. Only validation failures
//! (e.g. an empty title) surface as `Err`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::assignments::{ColumnAssignments, Placement, Repair};
use crate::column::ColumnId;
use crate::config::Config;
use crate::error::Result;
use crate::store::TaskStore;
use crate::task::{Priority, Task, TaskFields, TaskPatch};

pub const BOARD_SCHEMA_VERSION: &str = "taskboard.board.v1";

/// Persisted form of a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub columns: BTreeMap<ColumnId, Vec<String>>,
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        Self {
            schema_version: BOARD_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            tasks: Vec::new(),
            columns: ColumnAssignments::new().sequences().clone(),
        }
    }
}

/// One column with its tasks in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnView<'a> {
    pub id: ColumnId,
    pub title: &'static str,
    pub count: usize,
    pub tasks: Vec<&'a Task>,
}

/// Result of reconciling the board with the remote collection's contents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub kept: usize,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Local tasks the remote never had; kept in place.
    pub local_only: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Board {
    store: TaskStore,
    assignments: ColumnAssignments,
    default_column: ColumnId,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Board {
    pub fn new(config: &Config) -> Self {
        Self {
            store: TaskStore::new(config.tasks.clone()),
            assignments: ColumnAssignments::new(),
            default_column: config.board.default_column,
        }
    }

    /// The demo board a fresh install starts from.
    pub fn sample(config: &Config) -> Result<Self> {
        let mut board = Self::new(config);
        let seed = [
            (
                ColumnId::Todo,
                "1",
                TaskFields::new("Design user interface mockups")
                    .with_description("Create wireframes and high-fidelity designs for the new dashboard")
                    .with_priority(Priority::High)
                    .with_assignee("Alex Chen"),
                seed_date(2024, 1, 25),
            ),
            (
                ColumnId::Todo,
                "2",
                TaskFields::new("Set up project repository")
                    .with_description("Initialize Git repo and configure CI/CD pipeline")
                    .with_priority(Priority::Medium)
                    .with_assignee("Sarah Kim"),
                seed_date(2024, 1, 22),
            ),
            (
                ColumnId::InProgress,
                "3",
                TaskFields::new("Write API documentation")
                    .with_description("Document all endpoints with examples and response schemas")
                    .with_priority(Priority::Low)
                    .with_assignee("Mike Johnson"),
                seed_date(2024, 1, 30),
            ),
        ];
        for (column, id, mut fields, due_date) in seed {
            fields.due_date = due_date;
            board.place_task(column, Task::new(id, fields))?;
        }
        Ok(board)
    }

    /// Rebuild a board from its snapshot, repairing broken placements.
    pub fn from_snapshot(config: &Config, snapshot: BoardSnapshot) -> (Self, Vec<Repair>) {
        let mut board = Self::new(config);
        for task in snapshot.tasks {
            let id = task.id.clone();
            if let Err(err) = board.store.insert(task) {
                tracing::warn!(task_id = %id, error = %err, "skipping unreadable task in snapshot");
            }
        }
        let (assignments, repairs) = ColumnAssignments::from_sequences(
            &snapshot.columns,
            board.store.ids(),
            board.default_column,
        );
        board.assignments = assignments;
        for repair in &repairs {
            tracing::warn!(%repair, "repaired board snapshot");
        }
        (board, repairs)
    }

    pub fn to_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            schema_version: BOARD_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            tasks: self.store.list().into_iter().cloned().collect(),
            columns: self.assignments.sequences().clone(),
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn assignments(&self) -> &ColumnAssignments {
        &self.assignments
    }

    pub(crate) fn assignments_mut(&mut self) -> &mut ColumnAssignments {
        &mut self.assignments
    }

    pub fn default_column(&self) -> ColumnId {
        self.default_column
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.store.get(task_id)
    }

    pub fn placement(&self, task_id: &str) -> Option<Placement> {
        self.assignments.placement(task_id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn resolve_task_id(&self, input: &str) -> Result<String> {
        self.store.resolve_task_id(input)
    }

    /// Create a task and append it to `column`.
    ///
    /// On validation failure neither the store nor the columns change.
    pub fn create_task(&mut self, column: ColumnId, fields: TaskFields) -> Result<Task> {
        let task = self.store.create(fields)?;
        self.assignments.append(column, &task.id);
        tracing::info!(task_id = %task.id, %column, "task created");
        Ok(task)
    }

    /// Insert a record that already has an id, appending it to `column`.
    pub fn place_task(&mut self, column: ColumnId, task: Task) -> Result<()> {
        let id = task.id.clone();
        self.store.insert(task)?;
        self.assignments.append(column, &id);
        Ok(())
    }

    /// Edit fields in place. Unknown ids return `Ok(None)`.
    pub fn update_task(&mut self, task_id: &str, patch: &TaskPatch) -> Result<Option<Task>> {
        let updated = self.store.update(task_id, patch)?;
        if updated.is_some() {
            tracing::info!(task_id, fields = ?patch.field_names(), "task updated");
        }
        Ok(updated)
    }

    /// Remove a task from the store and from its column in one step.
    pub fn delete_task(&mut self, task_id: &str) -> Option<Task> {
        let task = self.store.remove(task_id)?;
        let placement = self.assignments.remove(task_id);
        tracing::info!(task_id, column = ?placement.map(|p| p.column), "task deleted");
        Some(task)
    }

    /// Explicit move: into `column`, before `before` when that task is in
    /// the target column, otherwise at the end.
    pub fn move_task(&mut self, task_id: &str, column: ColumnId, before: Option<&str>) -> Option<Placement> {
        if !self.assignments.contains(task_id) {
            return None;
        }
        if before == Some(task_id) {
            return self.assignments.placement(task_id);
        }
        let index = before.and_then(|id| self.assignments.position(column, id));
        let current = self.assignments.placement(task_id)?;
        // Within a column the target index shifts once the task is lifted out.
        let index = match index {
            Some(idx) if current.column == column && current.index < idx => Some(idx - 1),
            other => other,
        };
        let placed = self.assignments.move_to(task_id, column, index)?;
        tracing::info!(task_id, from = %current.column, to = %column, index = placed.index, "task moved");
        Some(placed)
    }

    /// Tasks of one column in display order.
    pub fn column_tasks(&self, column: ColumnId) -> Vec<&Task> {
        self.assignments
            .sequence(column)
            .iter()
            .filter_map(|id| self.store.get(id))
            .collect()
    }

    pub fn column_view(&self, column: ColumnId) -> ColumnView<'_> {
        let tasks = self.column_tasks(column);
        ColumnView {
            id: column,
            title: column.title(),
            count: tasks.len(),
            tasks,
        }
    }

    /// All columns in board order.
    pub fn columns(&self) -> Vec<ColumnView<'_>> {
        ColumnId::ALL
            .into_iter()
            .map(|column| self.column_view(column))
            .collect()
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.assignments.check(self.store.ids())
    }

    /// Replace the task set with the remote collection's contents.
    ///
    /// `remote_ids` maps local ids to the ids the remote assigned them and
    /// `mirrored` holds the remote ids known to have existed remotely.
    /// Known tasks keep their column and order under their remote id;
    /// tasks only the remote knows are appended to the default column.
    /// A local task missing from the remote is dropped only if it was
    /// mirrored before; otherwise it stays and is reported as local-only.
    pub fn reconcile(
        &mut self,
        remote: Vec<Task>,
        remote_ids: &BTreeMap<String, String>,
        mirrored: &BTreeSet<String>,
    ) -> ReconcileReport {
        let mut next_store = TaskStore::new(self.store.config().clone());
        for task in remote {
            let id = task.id.clone();
            if let Err(err) = next_store.insert(task) {
                tracing::warn!(task_id = %id, error = %err, "skipping unreadable remote task");
            }
        }
        let remote_count = next_store.len();

        let mut report = ReconcileReport::default();
        let mut assignments = self.assignments.clone();
        let store = &self.store;
        assignments.rename_all(|local| {
            let remote_id = remote_ids.get(local).map(String::as_str).unwrap_or(local);
            if next_store.contains(remote_id) {
                report.kept += 1;
                return Some(remote_id.to_string());
            }
            if mirrored.contains(remote_id) {
                report.removed.push(local.to_string());
                return None;
            }
            let task = store.get(local)?.clone();
            match next_store.insert(task) {
                Ok(()) => {
                    report.local_only.push(local.to_string());
                    Some(local.to_string())
                }
                Err(err) => {
                    tracing::warn!(task_id = %local, error = %err, "dropping local task");
                    report.removed.push(local.to_string());
                    None
                }
            }
        });

        let mut added: Vec<String> = next_store
            .ids()
            .filter(|id| !assignments.contains(id))
            .map(str::to_string)
            .collect();
        added.sort();
        for id in &added {
            assignments.append(self.default_column, id);
        }
        report.added = added;

        self.store = next_store;
        self.assignments = assignments;
        tracing::info!(
            remote = remote_count,
            kept = report.kept,
            added = report.added.len(),
            removed = report.removed.len(),
            local_only = report.local_only.len(),
            "board reconciled with remote"
        );
        report
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn ids(board: &Board, column: ColumnId) -> Vec<String> {
        board.assignments().sequence(column).to_vec()
    }

    fn board_with(layout: &[(ColumnId, &[&str])]) -> Board {
        let mut board = Board::default();
        for (column, task_ids) in layout {
            for id in *task_ids {
                board
                    .place_task(*column, Task::new(*id, TaskFields::new(format!("task {id}"))))
                    .expect("place");
            }
        }
        board
    }

    #[test]
    fn create_appends_to_column() {
        let mut board = board_with(&[(ColumnId::Todo, &["a"])]);
        let task = board
            .create_task(ColumnId::Todo, TaskFields::new("New"))
            .expect("create");
        assert_eq!(ids(&board, ColumnId::Todo), vec!["a".to_string(), task.id]);
        board.check_invariants().expect("invariants");
    }

    #[test]
    fn create_with_empty_title_changes_nothing() {
        let mut board = board_with(&[(ColumnId::Todo, &["a"])]);
        let before = board.assignments().clone();
        let err = board
            .create_task(ColumnId::Done, TaskFields::new(""))
            .expect_err("rejected");
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(board.len(), 1);
        assert_eq!(board.assignments(), &before);
    }

    #[test]
    fn delete_removes_from_store_and_column() {
        let mut board = board_with(&[(ColumnId::InProgress, &["b"])]);
        let removed = board.delete_task("b").expect("deleted");
        assert_eq!(removed.id, "b");
        assert!(ids(&board, ColumnId::InProgress).is_empty());
        assert!(board.task("b").is_none());
        assert!(board.delete_task("b").is_none());
        board.check_invariants().expect("invariants");
    }

    #[test]
    fn update_never_moves_task() {
        let mut board = board_with(&[(ColumnId::Done, &["a", "b"])]);
        let patch = TaskPatch {
            title: Some("renamed".to_string()),
            ..TaskPatch::default()
        };
        board.update_task("b", &patch).expect("update");
        assert_eq!(board.task("b").map(Task::title), Some("renamed"));
        assert_eq!(ids(&board, ColumnId::Done), vec!["a", "b"]);
        assert!(board.update_task("zz", &patch).expect("noop").is_none());
    }

    #[test]
    fn move_task_before_and_append() {
        let mut board = board_with(&[(ColumnId::Todo, &["a", "b", "c"]), (ColumnId::Done, &["d"])]);
        board.move_task("c", ColumnId::Done, Some("d")).expect("moved");
        assert_eq!(ids(&board, ColumnId::Done), vec!["c", "d"]);
        board.move_task("a", ColumnId::Todo, None).expect("moved");
        assert_eq!(ids(&board, ColumnId::Todo), vec!["b", "a"]);
        board.move_task("b", ColumnId::Done, Some("nope")).expect("moved");
        assert_eq!(ids(&board, ColumnId::Done), vec!["c", "d", "b"]);
        assert!(board.move_task("ghost", ColumnId::Todo, None).is_none());
        board.check_invariants().expect("invariants");
    }

    #[test]
    fn move_task_before_later_sibling_lands_in_front_of_it() {
        let mut board = board_with(&[(ColumnId::Todo, &["a", "b", "c"])]);
        board.move_task("a", ColumnId::Todo, Some("c")).expect("moved");
        assert_eq!(ids(&board, ColumnId::Todo), vec!["b", "a", "c"]);
    }

    #[test]
    fn sample_matches_seed_layout() {
        let board = Board::sample(&Config::default()).expect("sample");
        assert_eq!(ids(&board, ColumnId::Todo), vec!["1", "2"]);
        assert_eq!(ids(&board, ColumnId::InProgress), vec!["3"]);
        assert!(ids(&board, ColumnId::Done).is_empty());
        board.check_invariants().expect("invariants");
    }

    #[test]
    fn snapshot_roundtrip_keeps_order() {
        let board = board_with(&[(ColumnId::Todo, &["b", "a"]), (ColumnId::Done, &["c"])]);
        let json = serde_json::to_string(&board.to_snapshot()).expect("serialize");
        let snapshot: BoardSnapshot = serde_json::from_str(&json).expect("deserialize");
        let (restored, repairs) = Board::from_snapshot(&Config::default(), snapshot);
        assert!(repairs.is_empty());
        assert_eq!(ids(&restored, ColumnId::Todo), vec!["b", "a"]);
        assert_eq!(ids(&restored, ColumnId::Done), vec!["c"]);
    }

    #[test]
    fn reconcile_keeps_layout_and_renames() {
        let mut board = board_with(&[(ColumnId::Todo, &["local-1", "x"]), (ColumnId::Done, &["y"])]);
        let mut remote_ids = BTreeMap::new();
        remote_ids.insert("local-1".to_string(), "R1".to_string());
        let mirrored: BTreeSet<String> = ["R1", "x", "y"].iter().map(|id| id.to_string()).collect();
        let remote = vec![
            Task::new("R1", TaskFields::new("one")),
            Task::new("y", TaskFields::new("why")),
            Task::new("z", TaskFields::new("zed")),
        ];
        let report = board.reconcile(remote, &remote_ids, &mirrored);
        assert_eq!(report.kept, 2);
        assert_eq!(report.added, vec!["z".to_string()]);
        assert_eq!(report.removed, vec!["x".to_string()]);
        assert!(report.local_only.is_empty());
        assert_eq!(ids(&board, ColumnId::Todo), vec!["R1", "z"]);
        assert_eq!(ids(&board, ColumnId::Done), vec!["y"]);
        board.check_invariants().expect("invariants");
    }

    #[test]
    fn reconcile_keeps_tasks_never_sent() {
        let mut board = board_with(&[(ColumnId::Todo, &["sent", "unsent"]), (ColumnId::Done, &["gone"])]);
        let mirrored: BTreeSet<String> = ["sent", "gone"].iter().map(|id| id.to_string()).collect();
        let remote = vec![Task::new("sent", TaskFields::new("one"))];

        let report = board.reconcile(remote, &BTreeMap::new(), &mirrored);
        assert_eq!(report.kept, 1);
        assert_eq!(report.removed, vec!["gone".to_string()]);
        assert_eq!(report.local_only, vec!["unsent".to_string()]);
        assert_eq!(ids(&board, ColumnId::Todo), vec!["sent", "unsent"]);
        assert!(ids(&board, ColumnId::Done).is_empty());
        assert_eq!(board.task("unsent").map(Task::title), Some("task unsent"));
        board.check_invariants().expect("invariants");
    }

    #[test]
    fn columns_view_in_board_order() {
        let board = Board::sample(&Config::default()).expect("sample");
        let views = board.columns();
        let titles: Vec<&str> = views.iter().map(|view| view.title).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Done"]);
        assert_eq!(views[0].count, 2);
        assert_eq!(views[0].tasks[0].id, "1");
    }
}
