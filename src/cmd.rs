//! Board commands for the interactive shell.
//!
//! Each input line is split into words, parsed into a `Commands` value with
//! clap, and executed against the session. Commands either dispatch an
//! action to the store or change the list settings; the resulting list or
//! feedback is written to the output.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::{debug, warn};

use crate::action::Action;
use crate::cli::Cli;
use crate::draft::TaskDraft;
use crate::fields::{FilterBy, NavView, Priority, SortKey, DEFAULT_CATEGORY, KNOWN_CATEGORIES};
use crate::session::Session;
use crate::table::{render_detail, render_stats, render_table, truncate};
use crate::transfer::EXPORT_FILE_NAME;

/// One line of shell input.
#[derive(Parser)]
#[command(name = "tb", no_binary_name = true, disable_version_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Category label (General, Design, Development, Marketing or any text).
        #[arg(long, default_value = DEFAULT_CATEGORY)]
        category: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Tag. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Update fields on a task.
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_desc")]
        desc: Option<String>,
        /// Remove the description.
        #[arg(long)]
        clear_desc: bool,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long)]
        clear_due: bool,
        /// Add tags. May be repeated.
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
        /// Remove tags. May be repeated.
        #[arg(long = "rm-tag")]
        rm_tags: Vec<String>,
    },

    /// Toggle a task between done and pending.
    Toggle { id: u64 },

    /// Toggle the favourite flag.
    #[command(alias = "favorite")]
    Fav { id: u64 },

    /// Move a task into or out of the archive.
    Archive { id: u64 },

    /// Delete a task.
    #[command(alias = "delete")]
    Rm { id: u64 },

    /// Toggle tasks in or out of the selection.
    Select {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Select every task in the current list.
    SelectAll,

    /// Clear the selection.
    Unselect,

    /// Mark every selected task done.
    BulkComplete,

    /// Delete every selected task.
    BulkDelete,

    /// Delete every completed task.
    ClearCompleted,

    /// Set the search text; no words clears it.
    Search { words: Vec<String> },

    /// Filter: all | completed | pending | favorites | overdue | low | medium | high | <category>.
    Filter { value: FilterBy },

    /// Sort key.
    Sort {
        #[arg(value_enum)]
        key: SortKey,
    },

    /// Switch between the active list and the archive.
    ShowArchived,

    /// Go to a view, presetting filter and archive visibility.
    Nav {
        #[arg(value_enum)]
        view: NavView,
    },

    /// Print the current list.
    #[command(alias = "ls")]
    List,

    /// Show every field of one task.
    View { id: u64 },

    /// Print aggregate counters.
    Stats,

    /// List distinct tags and counts.
    Tags,

    /// List categories and counts.
    Categories,

    /// Write all tasks to a JSON file (default: tasks.json).
    Export { path: Option<PathBuf> },

    /// Replace all tasks with the contents of an exported JSON file.
    Import { path: PathBuf },

    /// Leave the board.
    #[command(alias = "exit")]
    Quit,
}

/// Clock readings for one command.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

impl Clock {
    pub fn current() -> Self {
        Self {
            now: Utc::now(),
            today: Local::now().date_naive(),
        }
    }
}

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse one line of input. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Commands>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words = shell_words::split(line).map_err(|e| format!("error: {e}"))?;
    Line::try_parse_from(words)
        .map(|l| Some(l.command))
        .map_err(|e| e.render().to_string())
}

/// Read commands until end of input or `quit`.
pub fn run_lines(
    session: &mut Session,
    input: impl BufRead,
    out: &mut impl Write,
    interactive: bool,
) -> anyhow::Result<()> {
    if interactive {
        writeln!(out, "Task board: {} task(s). Type 'help' for commands.", session.store().len())?;
        prompt(out)?;
    }
    for line in input.lines() {
        let line = line.context("failed to read command")?;
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                if execute(session, command, Clock::current(), out)? == Flow::Quit {
                    return Ok(());
                }
            }
            Err(msg) => {
                debug!(line = %line, "unparsed command");
                write!(out, "{msg}")?;
                if !msg.ends_with('\n') {
                    writeln!(out)?;
                }
            }
        }
        if interactive {
            prompt(out)?;
        }
    }
    Ok(())
}

fn prompt(out: &mut impl Write) -> std::io::Result<()> {
    write!(out, "tb> ")?;
    out.flush()
}

/// Run one command against the session.
pub fn execute(
    session: &mut Session,
    command: Commands,
    clock: Clock,
    out: &mut impl Write,
) -> anyhow::Result<Flow> {
    match command {
        Commands::Add { title, desc, priority, category, due, tags } => {
            let mut draft = TaskDraft::new(title);
            draft.description = desc.unwrap_or_default();
            draft.priority = priority;
            draft.category = category;
            draft.due = due.unwrap_or_default();
            for tag in &tags {
                draft.add_tag(tag);
            }
            match session.add(draft, clock.now, clock.today) {
                Ok(id) => writeln!(out, "Added task {id}")?,
                Err(e) => report(out, &e)?,
            }
        }

        Commands::Edit {
            id, title, desc, clear_desc, priority, category, due, clear_due, add_tags, rm_tags,
        } => {
            let Some(task) = session.store().get(id) else {
                writeln!(out, "Task {id} not found.")?;
                return Ok(Flow::Continue);
            };
            let mut draft = TaskDraft::from_task(task);
            if let Some(t) = title {
                draft.title = t;
            }
            if let Some(d) = desc {
                draft.description = d;
            }
            if clear_desc {
                draft.description.clear();
            }
            if let Some(p) = priority {
                draft.priority = p;
            }
            if let Some(c) = category {
                draft.category = c;
            }
            if let Some(d) = due {
                draft.due = d;
            }
            if clear_due {
                draft.due.clear();
            }
            for tag in &rm_tags {
                draft.remove_tag(tag.trim());
            }
            for tag in &add_tags {
                draft.add_tag(tag);
            }
            match session.edit(id, draft, clock.now, clock.today) {
                Ok(d) if d.changed == 0 => writeln!(out, "Task {id} unchanged.")?,
                Ok(_) => writeln!(out, "Updated task {id}")?,
                Err(e) => report(out, &e)?,
            }
        }

        Commands::Toggle { id } => {
            toggle(session, Action::ToggleComplete(id), id, clock, out, |t| {
                if t.completed { "done" } else { "pending" }
            })?;
        }
        Commands::Fav { id } => {
            toggle(session, Action::ToggleFavorite(id), id, clock, out, |t| {
                if t.favorite { "favourited" } else { "unfavourited" }
            })?;
        }
        Commands::Archive { id } => {
            toggle(session, Action::ToggleArchive(id), id, clock, out, |t| {
                if t.archived { "archived" } else { "restored" }
            })?;
        }

        Commands::Rm { id } => {
            let d = session.dispatch(Action::Delete(id), clock.now);
            if d.changed == 0 {
                writeln!(out, "Task {id} not found.")?;
            } else {
                writeln!(out, "Deleted task {id}")?;
            }
        }

        Commands::Select { ids } => {
            for id in ids {
                if session.store().get(id).is_none() {
                    writeln!(out, "Task {id} not found.")?;
                    continue;
                }
                session.selection.toggle(id);
            }
            writeln!(out, "{} selected", session.selection.len())?;
        }
        Commands::SelectAll => {
            session.select_visible(clock.today);
            writeln!(out, "{} selected", session.selection.len())?;
        }
        Commands::Unselect => {
            session.selection.clear();
            writeln!(out, "Selection cleared")?;
        }

        Commands::BulkComplete => match session.bulk_complete(clock.now) {
            Some(d) => writeln!(out, "{} task(s) completed", d.changed)?,
            None => writeln!(out, "Nothing selected.")?,
        },
        Commands::BulkDelete => match session.bulk_delete(clock.now) {
            Some(d) => writeln!(out, "{} task(s) deleted", d.changed)?,
            None => writeln!(out, "Nothing selected.")?,
        },
        Commands::ClearCompleted => {
            let d = session.dispatch(Action::ClearCompleted, clock.now);
            writeln!(out, "Removed {} completed task(s)", d.changed)?;
        }

        Commands::Search { words } => {
            session.view.search = words.join(" ");
            print_list(session, clock, out)?;
        }
        Commands::Filter { value } => {
            session.view.filter = value;
            print_list(session, clock, out)?;
        }
        Commands::Sort { key } => {
            session.view.sort = key;
            print_list(session, clock, out)?;
        }
        Commands::ShowArchived => {
            session.view.show_archived = !session.view.show_archived;
            print_list(session, clock, out)?;
        }
        Commands::Nav { view } => {
            session.navigate(view);
            if view == NavView::Stats {
                write!(out, "{}", render_stats(&session.stats(clock.today)))?;
            } else {
                print_list(session, clock, out)?;
            }
        }
        Commands::List => print_list(session, clock, out)?,

        Commands::View { id } => match session.store().get(id) {
            Some(t) => write!(out, "{}", render_detail(t, clock.today))?,
            None => writeln!(out, "Task {id} not found.")?,
        },
        Commands::Stats => write!(out, "{}", render_stats(&session.stats(clock.today)))?,
        Commands::Tags => cmd_tags(session, out)?,
        Commands::Categories => cmd_categories(session, out)?,

        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            match session.export(&path) {
                Ok(()) => writeln!(out, "Exported {} task(s) to {}", session.store().len(), path.display())?,
                Err(e) => report(out, &e)?,
            }
        }
        Commands::Import { path } => match session.import(&path, clock.now) {
            Ok(d) => writeln!(out, "Loaded {} task(s) from {}", d.changed, path.display())?,
            Err(e) => report(out, &e)?,
        },

        Commands::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn toggle(
    session: &mut Session,
    action: Action,
    id: u64,
    clock: Clock,
    out: &mut impl Write,
    describe: impl Fn(&crate::task::Task) -> &'static str,
) -> std::io::Result<()> {
    session.dispatch(action, clock.now);
    match session.store().get(id) {
        Some(t) => writeln!(out, "Task {id} {}", describe(t)),
        None => writeln!(out, "Task {id} not found."),
    }
}

fn report(out: &mut impl Write, err: &dyn std::error::Error) -> std::io::Result<()> {
    warn!(error = %err, "command failed");
    writeln!(out, "error: {err}")
}

fn print_list(session: &Session, clock: Clock, out: &mut impl Write) -> std::io::Result<()> {
    let visible = session.visible(clock.today);
    let v = &session.view;
    writeln!(
        out,
        "{} | filter: {} | sort: {:?}{}{}",
        if v.show_archived { "Archive" } else { session.nav().label() },
        v.filter,
        v.sort,
        if v.search.is_empty() { String::new() } else { format!(" | search: {:?}", v.search) },
        if session.selection.is_empty() {
            String::new()
        } else {
            format!(" | {} selected", session.selection.len())
        },
    )?;
    write!(out, "{}", render_table(&visible, &session.selection, clock.today))
}

/// List all distinct tags with their usage counts.
fn cmd_tags(session: &Session, out: &mut impl Write) -> std::io::Result<()> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for t in session.store().tasks() {
        for tag in &t.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    writeln!(out, "{:<16} Count", "Tag")?;
    for (tag, c) in counts {
        writeln!(out, "{:<16} {}", truncate(tag, 16), c)?;
    }
    Ok(())
}

/// List the known categories plus any others in use, with task counts.
fn cmd_categories(session: &Session, out: &mut impl Write) -> std::io::Result<()> {
    let mut counts: BTreeMap<&str, usize> = KNOWN_CATEGORIES.iter().map(|c| (*c, 0)).collect();
    for t in session.store().tasks() {
        *counts.entry(t.category.as_str()).or_default() += 1;
    }
    writeln!(out, "{:<16} Count", "Category")?;
    for (category, c) in counts {
        writeln!(out, "{:<16} {}", truncate(category, 16), c)?;
    }
    Ok(())
}

/// Write the completion script for `shell` covering the top-level `tb` flags.
pub fn cmd_completions(shell: Shell, out: &mut impl Write) {
    let mut command = Cli::command();
    generate(shell, &mut command, "tb", out);
}
