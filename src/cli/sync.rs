//! Remote sync commands: sync (flush the outbox) and pull (rebuild from
//! the collection).

use serde::Serialize;

use crate::board::ReconcileReport;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::persistence::TaskCollection;
use crate::task::Task;

use super::context::BoardContext;
use super::GlobalOptions;

#[derive(Serialize)]
struct SyncOutput {
    collection: String,
    applied: usize,
    remaining: usize,
    created: std::collections::BTreeMap<String, String>,
}

#[derive(Serialize)]
struct PullOutput {
    collection: String,
    flushed: usize,
    tasks: usize,
    pending: usize,
    #[serde(flatten)]
    reconcile: ReconcileReport,
}

pub fn run_sync(global: GlobalOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&global)?;
    let collection = ctx.config.persistence.collection.trim().to_string();
    let flushed = ctx.flush();
    // Whatever went through is recorded even when a later call failed.
    ctx.storage.save_outbox(&ctx.outbox)?;
    let report = flushed?;

    let mut human = HumanOutput::new(if report.applied == 0 {
        "taskboard sync: nothing to send"
    } else {
        "taskboard sync: pushed changes"
    });
    human.push_summary("collection", collection.clone());
    human.push_summary("applied", report.applied.to_string());
    for (local, remote) in &report.created {
        human.push_detail(format!("{local} -> {remote}"));
    }
    if !report.created.is_empty() {
        human.push_next_step("taskboard pull");
    }

    let output = SyncOutput {
        collection,
        applied: report.applied,
        remaining: report.remaining,
        created: report.created,
    };
    emit_success(global.output(), "sync", &output, Some(&human))
}

pub fn run_pull(global: GlobalOptions) -> Result<()> {
    let mut ctx = BoardContext::open(&global)?;
    let flushed = ctx.flush();
    ctx.storage.save_outbox(&ctx.outbox)?;
    let flushed = flushed?;

    let mut collection = ctx.storage.collection(&ctx.config);
    let remote = collection.list()?;
    let tasks = remote.len();
    let listed: Vec<String> = remote.iter().map(|task| task.id.clone()).collect();
    let reconcile = ctx
        .board
        .reconcile(remote, ctx.outbox.remote_ids(), ctx.outbox.mirrored());
    ctx.outbox.clear_remote_ids();
    ctx.outbox.set_mirrored(listed);

    // Tasks the remote never received are queued now so they reach it.
    let unsent: Vec<Task> = reconcile
        .local_only
        .iter()
        .filter_map(|id| ctx.board.task(id).cloned())
        .collect();
    for task in &unsent {
        ctx.record_create(task);
    }
    let warnings = ctx.commit()?;

    let mut human = HumanOutput::new("taskboard pull: board rebuilt from remote");
    human.push_summary("collection", collection.name().to_string());
    human.push_summary("tasks", tasks.to_string());
    human.push_summary("added", reconcile.added.len().to_string());
    human.push_summary("removed", reconcile.removed.len().to_string());
    for id in &reconcile.removed {
        human.push_detail(format!("dropped {id} (deleted remotely)"));
    }
    for id in &reconcile.local_only {
        human.push_detail(format!("kept {id} (not yet on remote)"));
    }
    for warning in warnings {
        human.push_warning(warning);
    }
    if !ctx.outbox.is_empty() {
        human.push_next_step("taskboard sync");
    }

    let output = PullOutput {
        collection: collection.name().to_string(),
        flushed: flushed.applied,
        tasks,
        pending: ctx.outbox.len(),
        reconcile,
    };
    emit_success(global.output(), "pull", &output, Some(&human))
}
