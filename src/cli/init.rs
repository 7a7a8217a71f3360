//! taskboard init command implementation
//!
//! Creates `.taskboard.toml` and the `.taskboard/` state directory.

use std::path::PathBuf;

use crate::board::Board;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::storage::Storage;

use super::GlobalOptions;

pub struct InitOptions {
    pub sample: bool,
    pub global: GlobalOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    dir: PathBuf,
    created: bool,
    sample: bool,
    tasks: usize,
}

pub fn run(options: InitOptions) -> Result<()> {
    let root = options.global.root()?;
    if root.exists() && !root.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "not a directory: {}",
            root.display()
        )));
    }
    std::fs::create_dir_all(&root)?;

    let storage = Storage::new(root.clone());
    let _lock = storage.lock()?;
    let config = storage.load_config()?;

    let mut human;
    let report = if storage.is_initialized() {
        let board = storage.load_board(&config)?;
        human = HumanOutput::new("taskboard init: nothing to do");
        if options.sample {
            human.push_warning("board already exists; --sample ignored");
        }
        InitReport {
            dir: root.clone(),
            created: false,
            sample: false,
            tasks: board.len(),
        }
    } else {
        let board = if options.sample {
            Board::sample(&config)?
        } else {
            Board::new(&config)
        };
        storage.init(&board)?;
        tracing::info!(dir = %root.display(), sample = options.sample, "board initialized");
        human = HumanOutput::new("taskboard init: initialized board");
        human.push_next_step("taskboard add \"<title>\"");
        human.push_next_step("taskboard board");
        InitReport {
            dir: root.clone(),
            created: true,
            sample: options.sample,
            tasks: board.len(),
        }
    };

    human.push_summary("dir", root.display().to_string());
    human.push_summary("tasks", report.tasks.to_string());

    emit_success(options.global.output(), "init", &report, Some(&human))
}
