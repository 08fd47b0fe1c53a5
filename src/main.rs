//! # TB - Task Board
//!
//! An in-memory task board driven from the terminal. Tasks can be created,
//! edited, filtered, sorted, favourited, archived and bulk-managed; the whole
//! board can be exported to and loaded from a JSON file.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board with the two sample tasks
//! tb
//!
//! # Start from an earlier export
//! tb --import tasks.json
//!
//! # Run a script of board commands
//! tb --empty run setup.tb
//! ```
//!
//! ## Key Commands
//!
//! - `add <title>` - Create a task (`--priority`, `--category`, `--due`, `--tag`)
//! - `toggle|fav|archive|rm <id>` - Per-task status changes
//! - `select <ids..>`, `bulk-complete`, `bulk-delete`, `clear-completed` - Bulk actions
//! - `search`, `filter`, `sort`, `nav`, `show-archived` - Shape the list
//! - `stats` - Totals, completed, pending, favourites, overdue, archived
//! - `export [path]`, `import <path>` - JSON transfer (default `tasks.json`)
//!
//! Nothing is written to disk unless you run `export`.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::Context;
use clap::Parser;
use tracing::info;

pub mod action;
pub mod cli;
pub mod cmd;
pub mod draft;
pub mod fields;
pub mod session;
pub mod store;
pub mod table;
pub mod task;
pub mod transfer;
pub mod view;

use cli::{Cli, Mode};
use cmd::*;
use session::Session;
use store::TaskStore;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose, cli.quiet)?;

    if let Some(Mode::Completions { shell }) = &cli.command {
        cmd_completions(*shell, &mut io::stdout());
        return Ok(());
    }

    let store = if cli.empty {
        TaskStore::default()
    } else if let Some(path) = cli.import.as_deref() {
        let tasks = transfer::import_from(path)
            .with_context(|| format!("failed to import {}", path.display()))?;
        TaskStore::new(tasks)
    } else {
        TaskStore::seeded()
    };
    info!(tasks = store.len(), "board ready");
    let mut session = Session::new(store);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        None | Some(Mode::Shell) => {
            let stdin = io::stdin();
            run_lines(&mut session, stdin.lock(), &mut out, true)?;
        }
        Some(Mode::Run { script }) => {
            let file = File::open(&script)
                .with_context(|| format!("failed to open script {}", script.display()))?;
            run_lines(&mut session, BufReader::new(file), &mut out, false)?;
        }
        Some(Mode::Completions { .. }) => unreachable!("completions handled above"),
    }
    Ok(())
}
