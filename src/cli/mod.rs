//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each group of subcommands is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod board;
mod context;
mod init;
mod sync;
mod task;

/// taskboard - Kanban task board
///
/// Keeps tasks in three columns (todo, in-progress, done), lets you
/// reorder them by simulated drag and drop, and mirrors changes to a
/// document collection.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Board directory (defaults to current directory)
    #[arg(long, global = true, env = "TASKBOARD_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a board in the target directory
    Init {
        /// Seed the board with demo tasks
        #[arg(long)]
        sample: bool,
    },

    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Column to add to: todo, in-progress, done
        #[arg(short, long)]
        column: Option<String>,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Person responsible
        #[arg(short, long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Process number (positive integer)
        #[arg(long)]
        process: Option<u32>,
    },

    /// Edit task fields
    Edit {
        /// Task ID (or unique suffix prefix)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        process: Option<u32>,

        /// Clear an optional field: description, assignee, due, process
        #[arg(long = "clear", value_name = "FIELD")]
        clear: Vec<String>,
    },

    /// Show one task
    Show {
        /// Task ID (or unique suffix prefix)
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task ID (or unique suffix prefix)
        id: String,
    },

    /// Show the board, column by column
    #[command(visible_alias = "ls")]
    Board,

    /// Move a task to a column
    Move {
        /// Task ID (or unique suffix prefix)
        id: String,

        /// Target column: todo, in-progress, done
        column: String,

        /// Insert before this task instead of at the end
        #[arg(long)]
        before: Option<String>,
    },

    /// Simulate dragging a card and dropping it
    Drag {
        /// Task ID of the dragged card
        id: String,

        /// Drop target: a task ID or a column; omit to drop outside the board
        #[arg(long)]
        over: Option<String>,

        /// Skip the drag-over event (a fast gesture)
        #[arg(long)]
        skip_over: bool,
    },

    /// Send pending changes to the remote collection
    Sync,

    /// Rebuild the task list from the remote collection
    Pull,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = GlobalOptions {
            dir: self.dir,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Init { sample } => init::run(init::InitOptions { sample, global }),
            Commands::Add {
                title,
                column,
                description,
                priority,
                assignee,
                due,
                process,
            } => task::run_add(task::AddOptions {
                title,
                column,
                description,
                priority,
                assignee,
                due,
                process,
                global,
            }),
            Commands::Edit {
                id,
                title,
                description,
                priority,
                assignee,
                due,
                process,
                clear,
            } => task::run_edit(task::EditOptions {
                id,
                title,
                description,
                priority,
                assignee,
                due,
                process,
                clear,
                global,
            }),
            Commands::Show { id } => task::run_show(task::ShowOptions { id, global }),
            Commands::Rm { id } => task::run_rm(task::RmOptions { id, global }),
            Commands::Board => board::run_board(global),
            Commands::Move { id, column, before } => board::run_move(board::MoveOptions {
                id,
                column,
                before,
                global,
            }),
            Commands::Drag {
                id,
                over,
                skip_over,
            } => board::run_drag(board::DragOptions {
                id,
                over,
                skip_over,
                global,
            }),
            Commands::Sync => sync::run_sync(global),
            Commands::Pull => sync::run_pull(global),
        }
    }
}

/// Flags shared by every subcommand
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    fn output(&self) -> crate::output::OutputOptions {
        crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    fn root(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}
