//! Fixed workflow columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the three static board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnId {
    Todo,
    InProgress,
    Done,
}

impl ColumnId {
    /// Columns in on-screen (left to right) order.
    pub const ALL: [ColumnId; 3] = [ColumnId::Todo, ColumnId::InProgress, ColumnId::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnId::Todo => "todo",
            ColumnId::InProgress => "in-progress",
            ColumnId::Done => "done",
        }
    }

    /// Display title
    pub fn title(self) -> &'static str {
        match self {
            ColumnId::Todo => "To Do",
            ColumnId::InProgress => "In Progress",
            ColumnId::Done => "Done",
        }
    }

    /// Exact match against a column identifier.
    ///
    /// Drop targets use this: an over-id names a column only if it is
    /// spelled exactly like one.
    pub fn from_id(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == raw)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = Error;

    /// Lenient parse for user input: case-insensitive, `_` or space for `-`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(&['_', ' '][..], "-");
        match normalized.as_str() {
            "todo" | "to-do" => Ok(ColumnId::Todo),
            "in-progress" | "progress" | "doing" => Ok(ColumnId::InProgress),
            "done" => Ok(ColumnId::Done),
            _ => Err(Error::InvalidArgument(format!(
                "unknown column '{}' (expected todo|in-progress|done)",
                raw.trim()
            ))),
        }
    }
}
