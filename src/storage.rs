//! Storage layer for taskboard
//!
//! All local state lives under the board root:
//!
//! ```text
//! .taskboard.toml               # Configuration
//! .taskboard/
//!   board.json                  # Board snapshot (tasks + column sequences)
//!   board.lock                  # Advisory lock for board/outbox writes
//!   outbox.json                 # Pending remote operations + id map
//!   remote/tasks.json           # Default file-backed collection
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::board::{Board, BoardSnapshot};
use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};
use crate::outbox::Outbox;
use crate::persistence::FileCollection;

/// Name of the local state directory
pub const LOCAL_DIR: &str = ".taskboard";

/// Storage manager for one board directory
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the `.taskboard/` directory
    pub fn local_dir(&self) -> PathBuf {
        self.root.join(LOCAL_DIR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn board_file(&self) -> PathBuf {
        self.local_dir().join("board.json")
    }

    pub fn outbox_file(&self) -> PathBuf {
        self.local_dir().join("outbox.json")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.local_dir().join("board.lock")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    pub fn is_initialized(&self) -> bool {
        self.board_file().exists()
    }

    /// Create `.taskboard/`, write `board` and an empty outbox, and a default
    /// config if none exists.
    pub fn init(&self, board: &Board) -> Result<()> {
        fs::create_dir_all(self.local_dir())?;
        let config_file = self.config_file();
        if !config_file.exists() {
            Config::default().save(&config_file)?;
        }
        self.save_board(board)?;
        if !self.outbox_file().exists() {
            self.save_outbox(&Outbox::new())?;
        }
        Ok(())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load_from_dir(&self.root)
    }

    /// Take the board lock for the lifetime of the returned guard.
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(self.lock_file(), DEFAULT_LOCK_TIMEOUT_MS)
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    /// Write JSON atomically (temp file, then rename)
    pub fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    pub fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        let data: T = serde_json::from_str(&content)?;
        Ok(data)
    }

    // =========================================================================
    // Board and outbox
    // =========================================================================

    /// Load the board snapshot, repairing it if needed.
    pub fn load_board(&self, config: &Config) -> Result<Board> {
        let path = self.board_file();
        if !path.exists() {
            return Err(Error::BoardNotFound(self.root.clone()));
        }
        let snapshot: BoardSnapshot = self.read_json(&path)?;
        let (board, repairs) = Board::from_snapshot(config, snapshot);
        if !repairs.is_empty() {
            tracing::warn!(
                path = %path.display(),
                repairs = repairs.len(),
                "board snapshot needed repair"
            );
        }
        Ok(board)
    }

    pub fn save_board(&self, board: &Board) -> Result<()> {
        self.write_json(&self.board_file(), &board.to_snapshot())
    }

    /// Load the outbox; a missing file is an empty outbox.
    pub fn load_outbox(&self) -> Result<Outbox> {
        let path = self.outbox_file();
        if !path.exists() {
            return Ok(Outbox::new());
        }
        self.read_json(&path)
    }

    pub fn save_outbox(&self, outbox: &Outbox) -> Result<()> {
        self.write_json(&self.outbox_file(), outbox)
    }

    /// File-backed collection configured for this board.
    pub fn collection(&self, config: &Config) -> FileCollection {
        FileCollection::new(
            config.persistence.collection.trim(),
            config.persistence.collection_path(&self.root),
        )
    }
}
