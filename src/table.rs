//! Plain-text formatting of tasks and counters for the shell.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::task::Task;
use crate::view::{Selection, Stats};

/// Short due label relative to `today`: "today", "tomorrow", "yesterday",
/// "in 3d" or "3d late".
pub fn due_label(due: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(due) = due else {
        return "-".into();
    };
    match (due - today).num_days() {
        0 => "today".into(),
        1 => "tomorrow".into(),
        -1 => "yesterday".into(),
        n if n > 1 => format!("in {n}d"),
        n => format!("{}d late", -n),
    }
}

/// Status flags as a fixed-width marker column: done, favourite, archived.
fn flags(task: &Task) -> String {
    let mut s = String::with_capacity(3);
    s.push(if task.completed { 'x' } else { ' ' });
    s.push(if task.favorite { '*' } else { ' ' });
    s.push(if task.archived { 'a' } else { ' ' });
    s
}

/// Render tasks as a table, one row per task.
pub fn render_table(tasks: &[&Task], selection: &Selection, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<1} {:<14} {:<3} {:<6} {:<12} {:<10} {}",
        "", "ID", "St", "Pri", "Category", "Due", "Title [tags]"
    );
    for t in tasks {
        let mark = if selection.contains(t.id) { ">" } else { " " };
        let tags = if t.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", t.tags.join(","))
        };
        let _ = writeln!(
            out,
            "{:<1} {:<14} {:<3} {:<6} {:<12} {:<10} {}{}",
            mark,
            t.id,
            flags(t),
            t.priority,
            truncate(&t.category, 12),
            due_label(t.due_date, today),
            t.title,
            tags
        );
    }
    if tasks.is_empty() {
        out.push_str("  (no tasks)\n");
    }
    out
}

/// Render every field of one task.
pub fn render_detail(task: &Task, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", task.id);
    let _ = writeln!(out, "Title:       {}", task.title);
    if let Some(desc) = &task.description {
        let _ = writeln!(out, "Description: {}", desc);
    }
    let _ = writeln!(out, "Priority:    {}", task.priority);
    let _ = writeln!(out, "Category:    {}", task.category);
    let _ = writeln!(
        out,
        "Due:         {}",
        match task.due_date {
            Some(d) => format!("{} ({})", d, due_label(Some(d), today)),
            None => "-".into(),
        }
    );
    let _ = writeln!(out, "Created:     {}", task.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Completed:   {}", yes_no(task.completed));
    let _ = writeln!(out, "Favorite:    {}", yes_no(task.favorite));
    let _ = writeln!(out, "Archived:    {}", yes_no(task.archived));
    let _ = writeln!(
        out,
        "Tags:        {}",
        if task.tags.is_empty() { "-".to_string() } else { task.tags.join(", ") }
    );
    out
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// Render the aggregate counters.
pub fn render_stats(stats: &Stats) -> String {
    format!(
        "Total {}  Completed {}  Pending {}  Favorites {}  Overdue {}  Archived {}  ({}% done)\n",
        stats.total,
        stats.completed,
        stats.pending,
        stats.favorites,
        stats.overdue,
        stats.archived,
        stats.completion_percent()
    )
}

/// Clip `s` to `width` characters, marking a cut with a trailing ellipsis.
pub fn truncate(s: &str, width: usize) -> String {
    match s.char_indices().nth(width) {
        None => s.to_string(),
        Some(_) => {
            let kept: String = s.chars().take(width.saturating_sub(1)).collect();
            format!("{kept}…")
        }
    }
}
