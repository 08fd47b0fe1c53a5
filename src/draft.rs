//! Task draft handling for the add and edit forms.
//!
//! A `TaskDraft` holds the unsaved field values of a task form. It is the
//! only place a blank title is refused: a draft turns into an `Action` only
//! once it validates.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::action::Action;
use crate::fields::{Priority, DEFAULT_CATEGORY};
use crate::task::{push_unique_tag, NewTask, Task, TaskPatch};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("invalid due date '{0}' (use YYYY-MM-DD, today, tomorrow, yesterday, in Nd or in Nw)")]
    InvalidDueDate(String),
}

/// Unsaved form state for creating or editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: String,
    /// Raw due date text as typed; blank means no due date.
    pub due: String,
    pub tags: Vec<String>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            category: DEFAULT_CATEGORY.to_string(),
            due: String::new(),
            tags: Vec::new(),
        }
    }
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// A draft pre-filled from an existing task, for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            category: task.category.clone(),
            due: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            tags: task.tags.clone(),
        }
    }

    /// Add a tag. Blank and duplicate tags are ignored.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        push_unique_tag(&mut self.tags, tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    fn validated(&self, today: NaiveDate) -> Result<(String, Option<NaiveDate>), DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let due = if self.due.trim().is_empty() {
            None
        } else {
            Some(
                parse_due_input(&self.due, today)
                    .ok_or_else(|| DraftError::InvalidDueDate(self.due.trim().to_string()))?,
            )
        };
        Ok((title.to_string(), due))
    }

    fn description(&self) -> Option<String> {
        let d = self.description.trim();
        (!d.is_empty()).then(|| d.to_string())
    }

    fn category(&self) -> String {
        let c = self.category.trim();
        if c.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            c.to_string()
        }
    }

    /// Creation payload for this draft.
    pub fn into_new_task(self, today: NaiveDate) -> Result<NewTask, DraftError> {
        let (title, due_date) = self.validated(today)?;
        Ok(NewTask {
            title,
            description: self.description(),
            priority: self.priority,
            category: self.category(),
            completed: false,
            favorite: false,
            archived: false,
            due_date,
            tags: self.tags,
        })
    }

    /// Patch replacing every form field of an existing task. Status flags are
    /// left alone.
    pub fn into_patch(self, today: NaiveDate) -> Result<TaskPatch, DraftError> {
        let (title, due_date) = self.validated(today)?;
        Ok(TaskPatch {
            title: Some(title),
            description: Some(self.description()),
            priority: Some(self.priority),
            category: Some(self.category()),
            due_date: Some(due_date),
            tags: Some(self.tags),
            ..TaskPatch::default()
        })
    }

    pub fn into_add_action(self, today: NaiveDate) -> Result<Action, DraftError> {
        self.into_new_task(today).map(Action::Add)
    }

    pub fn into_update_action(self, id: u64, today: NaiveDate) -> Result<Action, DraftError> {
        self.into_patch(today).map(|patch| Action::Update { id, patch })
    }
}

/// Parse due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD" format
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Duration::try_days(days).and_then(|d| today.checked_add_signed(d));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Duration::try_weeks(weeks).and_then(|d| today.checked_add_signed(d));
            }
        }
        return None;
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::initial_tasks;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 21).unwrap()
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            TaskDraft::new("   ").into_add_action(today()),
            Err(DraftError::EmptyTitle)
        );
        let tasks = initial_tasks();
        let t = &tasks[0];
        let mut draft = TaskDraft::from_task(t);
        draft.title.clear();
        assert_eq!(
            draft.into_update_action(t.id, today()),
            Err(DraftError::EmptyTitle)
        );
    }

    #[test]
    fn new_task_uses_form_defaults_and_trims() {
        let mut draft = TaskDraft::new("  Plan sprint  ");
        draft.due = "tomorrow".into();
        draft.add_tag("team");
        draft.add_tag("team");
        let new = draft.into_new_task(today()).unwrap();
        assert_eq!(new.title, "Plan sprint");
        assert_eq!(new.priority, Priority::Medium);
        assert_eq!(new.category, "General");
        assert_eq!(new.description, None);
        assert_eq!(new.due_date, NaiveDate::from_ymd_opt(2025, 6, 22));
        assert_eq!(new.tags, vec!["team".to_string()]);
    }

    #[test]
    fn bad_due_text_is_reported() {
        let mut draft = TaskDraft::new("x");
        draft.due = "someday".into();
        assert_eq!(
            draft.into_new_task(today()),
            Err(DraftError::InvalidDueDate("someday".into()))
        );
    }

    #[test]
    fn edit_round_trips_existing_fields() {
        let tasks = initial_tasks();
        let t = &tasks[0];
        let mut draft = TaskDraft::from_task(t);
        assert_eq!(draft.due, "2025-06-25");
        assert!(draft.remove_tag("urgent"));
        let patch = draft.into_patch(today()).unwrap();
        let mut edited = t.clone();
        patch.apply_to(&mut edited);
        assert_eq!(edited.tags, vec!["ui".to_string(), "design".to_string()]);
        assert_eq!(edited.description, t.description);
        assert_eq!(edited.due_date, t.due_date);
        assert_eq!(edited.completed, t.completed);
    }

    #[test]
    fn clearing_due_text_clears_due_date() {
        let tasks = initial_tasks();
        let t = &tasks[0];
        let mut draft = TaskDraft::from_task(t);
        draft.due.clear();
        let patch = draft.into_patch(today()).unwrap();
        assert_eq!(patch.due_date, Some(None));
    }

    #[test]
    fn parses_relative_due_dates() {
        assert_eq!(parse_due_input("today", today()), Some(today()));
        assert_eq!(
            parse_due_input("yesterday", today()),
            NaiveDate::from_ymd_opt(2025, 6, 20)
        );
        assert_eq!(
            parse_due_input("in 3d", today()),
            NaiveDate::from_ymd_opt(2025, 6, 24)
        );
        assert_eq!(
            parse_due_input("in 2w", today()),
            NaiveDate::from_ymd_opt(2025, 7, 5)
        );
        assert_eq!(
            parse_due_input("2025-12-31", today()),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
        assert_eq!(parse_due_input("in x", today()), None);
    }
}
