//! Board commands: board (ls), move, drag.

use serde::Serialize;

use crate::assignments::Placement;
use crate::board::{Board, ColumnView};
use crate::column::ColumnId;
use crate::drag::{DragOutcome, DragSession, GestureReport};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::Task;

use super::context::BoardContext;
use super::GlobalOptions;

pub struct MoveOptions {
    pub id: String,
    pub column: String,
    pub before: Option<String>,
    pub global: GlobalOptions,
}

pub struct DragOptions {
    pub id: String,
    pub over: Option<String>,
    pub skip_over: bool,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct BoardOutput<'a> {
    total: usize,
    columns: Vec<ColumnView<'a>>,
}

#[derive(Serialize)]
struct MoveOutput {
    id: String,
    from: Placement,
    to: Placement,
}

#[derive(Serialize)]
struct DragOutput<'a> {
    #[serde(flatten)]
    gesture: &'a GestureReport,
    changed: bool,
}

pub fn run_board(global: GlobalOptions) -> Result<()> {
    let ctx = BoardContext::open(&global)?;
    let output = BoardOutput {
        total: ctx.board.len(),
        columns: ctx.board.columns(),
    };

    let mut human = HumanOutput::new("Board");
    push_columns(&mut human, &output.columns);
    if !ctx.outbox.is_empty() {
        human.push_warning(format!("{} change(s) not yet synced", ctx.outbox.len()));
        human.push_next_step("taskboard sync");
    }

    emit_success(global.output(), "board", &output, Some(&human))
}

pub fn run_move(options: MoveOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&options.global)?;
    let resolved = ctx.board.resolve_task_id(&options.id)?;
    let column = options.column.parse::<ColumnId>()?;
    let before = options
        .before
        .as_deref()
        .map(|id| ctx.board.resolve_task_id(id))
        .transpose()?;

    let from = ctx
        .board
        .placement(&resolved)
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;
    let to = ctx
        .board
        .move_task(&resolved, column, before.as_deref())
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;
    let warnings = ctx.commit()?;

    let mut human = HumanOutput::new("Task moved");
    human.push_summary("ID", resolved.clone());
    human.push_summary("From", format!("{} (#{})", from.column.title(), from.index + 1));
    human.push_summary("To", format!("{} (#{})", to.column.title(), to.index + 1));
    for warning in warnings {
        human.push_warning(warning);
    }

    let output = MoveOutput {
        id: resolved,
        from,
        to,
    };
    emit_success(options.global.output(), "move", &output, Some(&human))
}

pub fn run_drag(options: DragOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&options.global)?;
    let active = ctx.board.resolve_task_id(&options.id)?;
    let over = options
        .over
        .as_deref()
        .map(|raw| resolve_drop_target(&ctx.board, raw))
        .transpose()?;

    let before = ctx.board.assignments().clone();
    let mut session = DragSession::new();
    let report = session.gesture(&mut ctx.board, &active, over.as_deref(), options.skip_over);
    let changed = ctx.board.assignments() != &before;
    let warnings = if changed { ctx.commit()? } else { Vec::new() };

    let mut human = HumanOutput::new(if changed {
        "Task dragged"
    } else {
        "Drag changed nothing"
    });
    human.push_summary("ID", active.clone());
    human.push_summary("Over", over.clone().unwrap_or_else(|| "(outside)".to_string()));
    if let Some(outcome) = report.over.as_ref() {
        human.push_summary("Drag over", outcome.describe());
    }
    human.push_summary("Drop", report.end.describe());
    if let Some(placement) = report.placement {
        human.push_summary(
            "Now in",
            format!("{} (#{})", placement.column.title(), placement.index + 1),
        );
        let column = ctx.board.column_view(placement.column);
        push_columns(&mut human, std::slice::from_ref(&column));
    }
    if matches!(report.end, DragOutcome::Ignored { .. }) && changed {
        human.push_detail("drop kept the position reached while dragging");
    }
    for warning in warnings {
        human.push_warning(warning);
    }

    let output = DragOutput {
        gesture: &report,
        changed,
    };
    emit_success(options.global.output(), "drag", &output, Some(&human))
}

/// A column name wins; anything else must name a task.
fn resolve_drop_target(board: &Board, raw: &str) -> Result<String> {
    if let Ok(column) = raw.parse::<ColumnId>() {
        return Ok(column.as_str().to_string());
    }
    board.resolve_task_id(raw)
}

fn push_columns(human: &mut HumanOutput, columns: &[ColumnView<'_>]) {
    for column in columns {
        let items = column.tasks.iter().map(|task| card_line(task)).collect();
        human.push_section(format!("{} ({})", column.title, column.count), items);
    }
}

fn card_line(task: &Task) -> String {
    let fields = &task.fields;
    let mut line = format!("{}  {}  [{}]", task.id, fields.title, fields.priority);
    if let Some(assignee) = fields.assignee.as_ref() {
        line.push_str(&format!("  @{assignee}"));
    }
    if let Some(due) = fields.due_date {
        line.push_str(&format!("  due {due}"));
    }
    line
}
