//! Property tests for the drag controller: whatever the pointer does, the
//! board keeps every task exactly once.

mod support;

use std::collections::BTreeMap;

use proptest::prelude::*;
use support::{board_with, ids};
use taskboard::{Board, ColumnId, DragSession};

const TASK_IDS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];
const TARGETS: [&str; 10] = ["a", "b", "c", "d", "e", "f", "todo", "in-progress", "done", "ghost"];

#[derive(Debug, Clone)]
enum Event {
    Start(usize),
    Over(usize, Option<usize>),
    End(usize, Option<usize>),
}

/// Mostly a real target; sometimes the pointer is outside the board.
fn target() -> impl Strategy<Value = Option<usize>> {
    proptest::option::weighted(0.9, 0..TARGETS.len())
}

fn event() -> impl Strategy<Value = Event> {
    let task = 0..TASK_IDS.len();
    prop_oneof![
        task.clone().prop_map(Event::Start),
        (task.clone(), target()).prop_map(|(t, o)| Event::Over(t, o)),
        (task, target()).prop_map(|(t, o)| Event::End(t, o)),
    ]
}

/// Spread the six tasks over the three columns.
fn layout() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..3usize, TASK_IDS.len())
}

fn build(columns: &[usize]) -> Board {
    let mut grouped: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for (id, column) in TASK_IDS.iter().zip(columns) {
        grouped.entry(*column).or_default().push(*id);
    }
    let layout: Vec<(ColumnId, &[&str])> = grouped
        .iter()
        .map(|(column, ids)| (ColumnId::ALL[*column], ids.as_slice()))
        .collect();
    board_with(&layout)
}

fn apply(board: &mut Board, session: &mut DragSession, event: &Event) {
    match event {
        Event::Start(task) => {
            session.drag_start(board, TASK_IDS[*task]);
        }
        Event::Over(task, over) => {
            session.drag_over(board, TASK_IDS[*task], over.map(|o| TARGETS[o]));
        }
        Event::End(task, over) => {
            session.drag_end(board, TASK_IDS[*task], over.map(|o| TARGETS[o]));
        }
    }
}

fn counts(board: &Board) -> Vec<usize> {
    ColumnId::ALL
        .into_iter()
        .map(|column| ids(board, column).len())
        .collect()
}

proptest! {
    #[test]
    fn every_task_stays_on_the_board_exactly_once(
        columns in layout(),
        events in proptest::collection::vec(event(), 0..40),
    ) {
        let mut board = build(&columns);
        let mut session = DragSession::new();
        for event in &events {
            apply(&mut board, &mut session, event);
            prop_assert!(board.check_invariants().is_ok());
        }

        let mut placed: Vec<String> = ColumnId::ALL
            .into_iter()
            .flat_map(|column| ids(&board, column))
            .collect();
        placed.sort();
        prop_assert_eq!(placed, TASK_IDS.iter().map(|id| id.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn drag_onto_self_is_a_no_op(columns in layout(), task in 0..TASK_IDS.len(), skip in any::<bool>()) {
        let mut board = build(&columns);
        let before = board.assignments().clone();
        let mut session = DragSession::new();
        let id = TASK_IDS[task];

        session.gesture(&mut board, id, Some(id), skip);

        prop_assert_eq!(board.assignments(), &before);
    }

    #[test]
    fn drop_on_column_appends(columns in layout(), task in 0..TASK_IDS.len(), target in 0..3usize) {
        let mut board = build(&columns);
        let mut session = DragSession::new();
        let id = TASK_IDS[task];
        let column = ColumnId::ALL[target];

        session.drag_end(&mut board, id, Some(column.as_str()));

        let sequence = ids(&board, column);
        prop_assert_eq!(sequence.last().map(String::as_str), Some(id));
    }

    #[test]
    fn same_column_drop_keeps_counts(columns in layout(), task in 0..TASK_IDS.len(), over in 0..TASK_IDS.len()) {
        let mut board = build(&columns);
        let before = counts(&board);
        let mut session = DragSession::new();
        let active = TASK_IDS[task];
        let over_id = TASK_IDS[over];
        prop_assume!(board.assignments().column_of(active) == board.assignments().column_of(over_id));

        session.gesture(&mut board, active, Some(over_id), true);

        prop_assert_eq!(counts(&board), before);
    }
}
