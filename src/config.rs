//! Configuration loading and management
//!
//! Handles parsing of `.taskboard.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::column::ColumnId;
use crate::error::Error;
use crate::task::Priority;

/// Name of the configuration file at the board root
pub const CONFIG_FILE: &str = ".taskboard.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Board layout configuration
    #[serde(default)]
    pub board: BoardConfig,

    /// Task configuration
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Remote collection configuration
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Board-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Column new tasks land in when none is given
    #[serde(default = "default_column")]
    pub default_column: ColumnId,
}

fn default_column() -> ColumnId {
    ColumnId::Todo
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_column: default_column(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Board-wide task ID prefix
    #[serde(default = "default_task_id_prefix")]
    pub id_prefix: String,

    /// Minimum task ID suffix length
    #[serde(default = "default_task_id_min_len")]
    pub id_min_len: usize,

    /// Priority for new tasks when none is given
    #[serde(default)]
    pub default_priority: Priority,
}

fn default_task_id_prefix() -> String {
    "tb".to_string()
}

fn default_task_id_min_len() -> usize {
    4
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_task_id_prefix(),
            id_min_len: default_task_id_min_len(),
            default_priority: Priority::default(),
        }
    }
}

/// Remote collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Mirror local mutations to the remote collection
    #[serde(default)]
    pub enabled: bool,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Directory holding the file-backed document store (relative to the board root)
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Flush the outbox after every mutating command
    #[serde(default = "default_true")]
    pub auto_flush: bool,
}

fn default_collection() -> String {
    "tasks".to_string()
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".taskboard").join("remote")
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            collection: default_collection(),
            store_dir: default_store_dir(),
            auto_flush: true,
        }
    }
}

impl Config {
    /// Load configuration from a `.taskboard.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the board root. A missing file means
    /// defaults; a file that fails to parse or validate is an error.
    pub fn load_from_dir(root: &Path) -> crate::error::Result<Self> {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load(&config_path).map_err(|err| {
            let message = match err {
                Error::InvalidConfig(message) => message,
                other => other.to_string(),
            };
            Error::InvalidConfig(format!("{}: {message}", config_path.display()))
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        self.tasks.validate()?;
        self.persistence.validate()?;
        Ok(())
    }
}

impl TasksConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let prefix = self.id_prefix.trim();
        if prefix.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.id_prefix cannot be empty".to_string(),
            ));
        }
        if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.id_prefix must be alphanumeric".to_string(),
            ));
        }
        if self.id_min_len < 3 {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.id_min_len must be >= 3".to_string(),
            ));
        }
        if self.id_min_len > 16 {
            return Err(crate::error::Error::InvalidConfig(
                "tasks.id_min_len must be <= 16".to_string(),
            ));
        }
        Ok(())
    }
}

impl PersistenceConfig {
    fn validate(&self) -> crate::error::Result<()> {
        let collection = self.collection.trim();
        if collection.is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "persistence.collection cannot be empty".to_string(),
            ));
        }
        if !collection
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(crate::error::Error::InvalidConfig(format!(
                "persistence.collection '{collection}' must be alphanumeric, '-' or '_'"
            )));
        }
        if self.store_dir.as_os_str().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "persistence.store_dir cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the collection document for a board rooted at `root`
    pub fn collection_path(&self, root: &Path) -> PathBuf {
        root.join(&self.store_dir)
            .join(format!("{}.json", self.collection.trim()))
    }
}
