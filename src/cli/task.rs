//! Task commands: add, edit, show, rm.

use serde::Serialize;

use crate::assignments::Placement;
use crate::column::ColumnId;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::{parse_due_date, Priority, Task, TaskFields, TaskPatch};

use super::context::BoardContext;
use super::GlobalOptions;

pub struct AddOptions {
    pub title: String,
    pub column: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub process: Option<u32>,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub process: Option<u32>,
    pub clear: Vec<String>,
    pub global: GlobalOptions,
}

pub struct ShowOptions {
    pub id: String,
    pub global: GlobalOptions,
}

pub struct RmOptions {
    pub id: String,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct TaskOutput<'a> {
    #[serde(flatten)]
    task: &'a Task,
    column: Option<ColumnId>,
    position: Option<usize>,
}

impl<'a> TaskOutput<'a> {
    fn new(task: &'a Task, placement: Option<Placement>) -> Self {
        Self {
            task,
            column: placement.map(|p| p.column),
            position: placement.map(|p| p.index + 1),
        }
    }
}

#[derive(Serialize)]
struct TaskEditOutput<'a> {
    #[serde(flatten)]
    task: TaskOutput<'a>,
    changed: Vec<&'static str>,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&options.global)?;
    let column = match options.column.as_deref() {
        Some(raw) => raw.parse::<ColumnId>()?,
        None => ctx.config.board.default_column,
    };
    let priority = match options.priority.as_deref() {
        Some(raw) => raw.parse::<Priority>()?,
        None => ctx.config.tasks.default_priority,
    };

    let fields = TaskFields {
        title: options.title,
        description: options.description,
        priority,
        assignee: options.assignee,
        due_date: options.due.as_deref().map(parse_due_date).transpose()?,
        process_number: options.process,
    };
    let task = ctx.board.create_task(column, fields)?;
    ctx.record_create(&task);
    let warnings = ctx.commit()?;

    let placement = ctx.board.placement(&task.id);
    let mut human = HumanOutput::new("Task created");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title().to_string());
    human.push_summary("Column", column.title());
    human.push_summary("Priority", task.priority().as_str());
    for warning in warnings {
        human.push_warning(warning);
    }

    emit_success(
        options.global.output(),
        "add",
        &TaskOutput::new(&task, placement),
        Some(&human),
    )
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&options.global)?;
    let resolved = ctx.board.resolve_task_id(&options.id)?;
    let patch = build_patch(&options)?;
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "edit requires at least one field to change".to_string(),
        ));
    }

    let task = ctx
        .board
        .update_task(&resolved, &patch)?
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;
    ctx.record_update(&resolved, &patch);
    let warnings = ctx.commit()?;

    let changed = patch.field_names();
    let mut human = HumanOutput::new("Task updated");
    human.push_summary("ID", resolved.clone());
    human.push_summary("Changed", changed.join(", "));
    push_task_summary(&mut human, &task);
    for warning in warnings {
        human.push_warning(warning);
    }

    let output = TaskEditOutput {
        task: TaskOutput::new(&task, ctx.board.placement(&resolved)),
        changed,
    };
    emit_success(options.global.output(), "edit", &output, Some(&human))
}

pub fn run_show(options: ShowOptions) -> Result<()> {
    let ctx = BoardContext::open(&options.global)?;
    let resolved = ctx.board.resolve_task_id(&options.id)?;
    let task = ctx
        .board
        .task(&resolved)
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;
    let placement = ctx.board.placement(&resolved);

    let mut human = HumanOutput::new(format!("Task {resolved}"));
    if let Some(placement) = placement {
        human.push_summary(
            "Column",
            format!("{} (#{})", placement.column.title(), placement.index + 1),
        );
    }
    push_task_summary(&mut human, task);
    if let Some(description) = task.fields.description.as_ref() {
        human.push_detail(description.clone());
    }

    emit_success(
        options.global.output(),
        "show",
        &TaskOutput::new(task, placement),
        Some(&human),
    )
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&options.global)?;
    let resolved = ctx.board.resolve_task_id(&options.id)?;
    let placement = ctx.board.placement(&resolved);
    let task = ctx
        .board
        .delete_task(&resolved)
        .ok_or_else(|| Error::TaskNotFound(resolved.clone()))?;
    ctx.record_delete(&resolved);
    let warnings = ctx.commit()?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", resolved);
    human.push_summary("Title", task.title().to_string());
    for warning in warnings {
        human.push_warning(warning);
    }

    emit_success(
        options.global.output(),
        "rm",
        &TaskOutput::new(&task, placement),
        Some(&human),
    )
}

fn build_patch(options: &EditOptions) -> Result<TaskPatch> {
    let mut patch = TaskPatch {
        title: options.title.clone(),
        description: options.description.clone().map(Some),
        priority: options
            .priority
            .as_deref()
            .map(str::parse::<Priority>)
            .transpose()?,
        assignee: options.assignee.clone().map(Some),
        due_date: options
            .due
            .as_deref()
            .map(parse_due_date)
            .transpose()?
            .map(Some),
        process_number: options.process.map(Some),
    };

    for field in &options.clear {
        let name = field.trim();
        // `replace` hands back what --<field> had set, if anything.
        let was_set = match name.to_ascii_lowercase().as_str() {
            "description" => patch.description.replace(None).flatten().is_some(),
            "assignee" => patch.assignee.replace(None).flatten().is_some(),
            "due" | "due-date" | "duedate" => patch.due_date.replace(None).flatten().is_some(),
            "process" | "process-number" => {
                patch.process_number.replace(None).flatten().is_some()
            }
            "title" | "priority" => {
                return Err(Error::InvalidArgument(format!("{name} cannot be cleared")))
            }
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "unknown field '{name}' (expected description|assignee|due|process)"
                )))
            }
        };
        if was_set {
            return Err(Error::InvalidArgument(format!(
                "cannot both set and clear {name}"
            )));
        }
    }
    Ok(patch)
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    let fields = &task.fields;
    human.push_summary("Title", fields.title.clone());
    human.push_summary("Priority", fields.priority.as_str());
    if let Some(assignee) = fields.assignee.as_ref() {
        human.push_summary("Assignee", assignee.clone());
    }
    if let Some(due) = fields.due_date {
        human.push_summary("Due", due.to_string());
    }
    if let Some(process) = fields.process_number {
        human.push_summary("Process", process.to_string());
    }
}
