#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

use taskboard::column::ColumnId;
use taskboard::task::{Task, TaskFields};
use taskboard::Board;

/// Temporary board directory driven through the CLI.
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    /// Empty directory; run `init` yourself.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn init() -> Self {
        let board = Self::empty();
        board.cmd().arg("init").assert().success();
        board
    }

    pub fn sample() -> Self {
        let board = Self::empty();
        board.cmd().args(["init", "--sample"]).assert().success();
        board
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = taskboard_cmd();
        cmd.current_dir(self.dir.path());
        cmd
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join(".taskboard.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    /// Turn on the file-backed remote collection.
    pub fn enable_persistence(&self, auto_flush: bool) {
        self.write_config(&format!(
            "[persistence]\nenabled = true\nauto_flush = {auto_flush}\n"
        ));
    }

    pub fn read_json(&self, rel_path: &str) -> Value {
        let raw = fs::read_to_string(self.dir.path().join(rel_path)).expect("read json file");
        serde_json::from_str(&raw).expect("parse json file")
    }

    pub fn board_json(&self) -> Value {
        self.read_json(".taskboard/board.json")
    }

    pub fn outbox_json(&self) -> Value {
        self.read_json(".taskboard/outbox.json")
    }

    pub fn remote_json(&self) -> Value {
        self.read_json(".taskboard/remote/tasks.json")
    }

    /// Ids in `column` according to the saved snapshot.
    pub fn column(&self, column: &str) -> Vec<String> {
        self.board_json()["columns"][column]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Run with `--json` and return the envelope's `data`.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run taskboard");
        assert!(
            output.status.success(),
            "taskboard {args:?} failed: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        let envelope: Value = serde_json::from_slice(&output.stdout).expect("json envelope");
        envelope["data"].clone()
    }

    /// Create a task and return its id.
    pub fn add(&self, title: &str, column: &str) -> String {
        let data = self.json(&["add", title, "--column", column]);
        data["id"].as_str().expect("task id").to_string()
    }
}

pub fn taskboard_cmd() -> Command {
    let mut cmd = Command::cargo_bin("taskboard").expect("binary");
    cmd.env_remove("TASKBOARD_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// In-memory board with known ids, laid out column by column.
pub fn board_with(layout: &[(ColumnId, &[&str])]) -> Board {
    let mut board = Board::default();
    for (column, ids) in layout {
        for id in *ids {
            board
                .place_task(*column, Task::new(*id, TaskFields::new(format!("Task {id}"))))
                .expect("place task");
        }
    }
    board
}

pub fn ids(board: &Board, column: ColumnId) -> Vec<String> {
    board.assignments().sequence(column).to_vec()
}
