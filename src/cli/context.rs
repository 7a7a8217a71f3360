//! Shared state for commands that act on an existing board.

use crate::board::Board;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::lock::FileLock;
use crate::outbox::{FlushReport, Outbox};
use crate::storage::Storage;
use crate::task::{Task, TaskPatch};

use super::GlobalOptions;

/// Board, outbox and config loaded under the board lock.
///
/// The lock is held until the context is dropped, so a command's
/// load-mutate-save cycle never interleaves with another invocation.
pub(super) struct BoardContext {
    pub storage: Storage,
    pub config: Config,
    pub board: Board,
    pub outbox: Outbox,
    _lock: FileLock,
}

impl BoardContext {
    pub fn open(global: &GlobalOptions) -> Result<Self> {
        let root = global.root()?;
        let storage = Storage::new(root.clone());
        if !storage.is_initialized() {
            return Err(Error::BoardNotFound(root));
        }
        let lock = storage.lock()?;
        let config = storage.load_config()?;
        let board = storage.load_board(&config)?;
        let outbox = storage.load_outbox()?;
        Ok(Self {
            storage,
            config,
            board,
            outbox,
            _lock: lock,
        })
    }

    fn mirrors_remote(&self) -> bool {
        self.config.persistence.enabled
    }

    pub fn record_create(&mut self, task: &Task) {
        if self.mirrors_remote() {
            self.outbox.record_create(task);
        }
    }

    pub fn record_update(&mut self, task_id: &str, patch: &TaskPatch) {
        if self.mirrors_remote() {
            self.outbox.record_update(task_id, patch);
        }
    }

    pub fn record_delete(&mut self, task_id: &str) {
        if self.mirrors_remote() {
            self.outbox.record_delete(task_id);
        }
    }

    /// Send pending operations to the configured collection.
    pub fn flush(&mut self) -> Result<FlushReport> {
        if !self.mirrors_remote() {
            return Err(Error::InvalidArgument(
                "remote persistence is disabled; set [persistence] enabled = true in .taskboard.toml"
                    .to_string(),
            ));
        }
        let mut collection = self.storage.collection(&self.config);
        self.outbox.flush(&mut collection)
    }

    /// Save local state, then flush if auto-flush is on.
    ///
    /// A failed flush never fails the command; it comes back as a warning
    /// and the operations stay queued.
    pub fn commit(&mut self) -> Result<Vec<String>> {
        self.board.check_invariants()?;
        self.storage.save_board(&self.board)?;

        let mut warnings = Vec::new();
        if self.mirrors_remote() && self.config.persistence.auto_flush && !self.outbox.is_empty() {
            if let Err(err) = self.flush() {
                warnings.push(format!(
                    "remote sync deferred ({} pending): {err}",
                    self.outbox.len()
                ));
            }
        }
        self.storage.save_outbox(&self.outbox)?;
        Ok(warnings)
    }
}
