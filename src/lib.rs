//! taskboard - Kanban task board library
//!
//! Core of the `taskboard` CLI: a task store, the per-column ordering of
//! task ids, and the drag-and-drop controller that reorders cards within
//! and across columns. Changes can be mirrored to a remote document
//! collection through a sync outbox.
//!
//! # Module Organization
//!
//! - `task`: Task records, create payloads and patches
//! - `column`: The fixed workflow columns
//! - `store`: In-memory task store and id generation
//! - `assignments`: Column → ordered task ids, with a reverse index
//! - `board`: Store + assignments behind one mutable handle
//! - `drag`: Drag session controller (start / over / end)
//! - `persistence`: Remote collection trait and backends
//! - `outbox`: Pending remote operations and the local → remote id map
//! - `storage`: `.taskboard/` files
//! - `lock`: File locking and atomic writes
//! - `config`: Configuration loading from `.taskboard.toml`
//! - `output`: Human and JSON output for CLI commands
//! - `cli`: Command-line interface using clap

pub mod assignments;
pub mod board;
pub mod cli;
pub mod column;
pub mod config;
pub mod drag;
pub mod error;
pub mod lock;
pub mod outbox;
pub mod output;
pub mod persistence;
pub mod storage;
pub mod store;
pub mod task;

pub use board::Board;
pub use column::ColumnId;
pub use drag::{DragOutcome, DragSession};
pub use error::{Error, Result};
pub use task::{Priority, Task, TaskFields, TaskPatch};
