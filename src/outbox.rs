//! Sync outbox.
//!
//! Local board mutations are applied immediately; the matching remote call
//! is queued here and sent later by [`Outbox::flush`]. A rejected call stays
//! at the head of the queue and nothing behind it is attempted, so remote
//! operations always arrive in the order they happened locally.
//!
//! The collection picks its own ids on create. Once a queued create has
//! been sent, the local → remote id pair is kept so later updates and
//! deletes address the right document.
//!
//! The outbox also remembers which remote documents it has seen, so a pull
//! can tell a task deleted remotely from one that was never sent.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::persistence::TaskCollection;
use crate::task::{Task, TaskFields, TaskPatch};

pub const OUTBOX_SCHEMA_VERSION: &str = "taskboard.outbox.v1";

/// A remote call waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PendingOp {
    Create {
        op_id: Uuid,
        task_id: String,
        fields: TaskFields,
    },
    Update {
        op_id: Uuid,
        task_id: String,
        patch: TaskPatch,
    },
    Delete {
        op_id: Uuid,
        task_id: String,
    },
}

impl PendingOp {
    pub fn op_id(&self) -> Uuid {
        match self {
            PendingOp::Create { op_id, .. }
            | PendingOp::Update { op_id, .. }
            | PendingOp::Delete { op_id, .. } => *op_id,
        }
    }

    /// Local id of the task this operation is about.
    pub fn task_id(&self) -> &str {
        match self {
            PendingOp::Create { task_id, .. }
            | PendingOp::Update { task_id, .. }
            | PendingOp::Delete { task_id, .. } => task_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PendingOp::Create { .. } => "create",
            PendingOp::Update { .. } => "update",
            PendingOp::Delete { .. } => "delete",
        }
    }
}

/// What a flush managed to send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    pub applied: usize,
    pub remaining: usize,
    /// Local → remote ids assigned during this flush.
    pub created: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outbox {
    pub schema_version: String,
    #[serde(default)]
    pending: VecDeque<PendingOp>,
    #[serde(default)]
    remote_ids: BTreeMap<String, String>,
    /// Remote ids known to exist in the collection.
    #[serde(default)]
    mirrored: BTreeSet<String>,
}

impl Default for Outbox {
    fn default() -> Self {
        Self {
            schema_version: OUTBOX_SCHEMA_VERSION.to_string(),
            pending: VecDeque::new(),
            remote_ids: BTreeMap::new(),
            mirrored: BTreeSet::new(),
        }
    }
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingOp> {
        self.pending.iter()
    }

    pub fn remote_ids(&self) -> &BTreeMap<String, String> {
        &self.remote_ids
    }

    /// Forget the id map once the board has been rebuilt under remote ids.
    pub fn clear_remote_ids(&mut self) {
        self.remote_ids.clear();
    }

    pub fn mirrored(&self) -> &BTreeSet<String> {
        &self.mirrored
    }

    /// Replace the known remote ids with what a `list()` returned.
    pub fn set_mirrored(&mut self, ids: impl IntoIterator<Item = String>) {
        self.mirrored = ids.into_iter().collect();
    }

    /// Id the collection knows this task by.
    pub fn remote_id<'a>(&'a self, task_id: &'a str) -> &'a str {
        self.remote_ids
            .get(task_id)
            .map(String::as_str)
            .unwrap_or(task_id)
    }

    fn has_pending_create(&self, task_id: &str) -> bool {
        self.pending
            .iter()
            .any(|op| matches!(op, PendingOp::Create { task_id: id, .. } if id == task_id))
    }

    pub fn record_create(&mut self, task: &Task) {
        self.pending.push_back(PendingOp::Create {
            op_id: Uuid::new_v4(),
            task_id: task.id.clone(),
            fields: task.fields.clone(),
        });
    }

    pub fn record_update(&mut self, task_id: &str, patch: &TaskPatch) {
        if patch.is_empty() {
            return;
        }
        self.pending.push_back(PendingOp::Update {
            op_id: Uuid::new_v4(),
            task_id: task_id.to_string(),
            patch: patch.clone(),
        });
    }

    /// Queue a delete. A task whose create never left the outbox is simply
    /// dropped from the queue.
    pub fn record_delete(&mut self, task_id: &str) {
        if self.has_pending_create(task_id) {
            self.pending.retain(|op| op.task_id() != task_id);
            return;
        }
        self.pending.push_back(PendingOp::Delete {
            op_id: Uuid::new_v4(),
            task_id: task_id.to_string(),
        });
    }

    /// Send queued operations in order, stopping at the first failure.
    ///
    /// Progress made before a failure is kept in `self`; persist the outbox
    /// whether or not this returns `Err`.
    pub fn flush(&mut self, collection: &mut dyn TaskCollection) -> Result<FlushReport> {
        let mut report = FlushReport::default();
        while let Some(op) = self.pending.front().cloned() {
            if let Err(err) = self.send(collection, &op, &mut report) {
                tracing::warn!(
                    collection = collection.name(),
                    op = op.kind(),
                    task_id = op.task_id(),
                    error = %err,
                    "remote call failed; keeping it queued"
                );
                return Err(err);
            }
            self.pending.pop_front();
            report.applied += 1;
        }
        report.remaining = self.pending.len();
        if report.applied > 0 {
            tracing::info!(
                collection = collection.name(),
                applied = report.applied,
                "outbox flushed"
            );
        }
        Ok(report)
    }

    fn send(&mut self, collection: &mut dyn TaskCollection, op: &PendingOp, report: &mut FlushReport) -> Result<()> {
        match op {
            PendingOp::Create { task_id, fields, .. } => {
                let created = collection.create(fields)?;
                report.created.insert(task_id.clone(), created.id.clone());
                self.mirrored.insert(created.id.clone());
                self.remote_ids.insert(task_id.clone(), created.id);
            }
            PendingOp::Update { task_id, patch, .. } => {
                collection.update(self.remote_id(task_id), patch)?;
            }
            PendingOp::Delete { task_id, .. } => {
                let remote_id = self.remote_id(task_id).to_string();
                collection.delete(&remote_id)?;
                self.mirrored.remove(&remote_id);
                self.remote_ids.remove(task_id);
            }
        }
        Ok(())
    }
}
