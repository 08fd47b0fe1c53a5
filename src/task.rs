//! Task data structure and related functionality.
//!
//! This module defines the `Task` record held by the store, the `NewTask`
//! payload used to create one, and the `TaskPatch` used to edit one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::fields::{Priority, DEFAULT_CATEGORY};

/// A single to-do record with scheduling, categorisation and status metadata.
///
/// The serialized shape uses camelCase keys (`dueDate`, `createdAt`) so that
/// exported files line up with the web board's format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// An unset date may be written as `""`; read that as no date.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl Task {
    /// Build a stored task from a creation payload plus the id and timestamp
    /// the store assigned to it.
    pub fn from_new(new: NewTask, id: u64, created_at: DateTime<Utc>) -> Self {
        let mut task = Task {
            id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            category: new.category,
            completed: new.completed,
            favorite: new.favorite,
            archived: new.archived,
            due_date: new.due_date,
            created_at,
            tags: Vec::with_capacity(new.tags.len()),
        };
        for tag in new.tags {
            task.add_tag(&tag);
        }
        task
    }

    /// Append a tag. Blank tags and tags already present are ignored.
    /// Returns whether the tag list changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        push_unique_tag(&mut self.tags, tag)
    }

    /// Due strictly before `today` and still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|d| d < today)
    }

    /// Case-insensitive substring match over title, description and tags.
    /// `needle` must already be lowercased; an empty needle matches.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Trim `tag` and push it unless blank or already present.
pub fn push_unique_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

/// Deduplicate tags in place, keeping the first occurrence of each.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        push_unique_tag(&mut out, &tag);
    }
    out
}

/// Fields for a task that does not exist yet. The store fills in `id` and
/// `created_at` when the `Add` action is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: String,
    pub completed: bool,
    pub favorite: bool,
    pub archived: bool,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            category: default_category(),
            completed: false,
            favorite: false,
            archived: false,
            due_date: None,
            tags: Vec::new(),
        }
    }
}

/// A partial update. `None` leaves a field unchanged; the nested options on
/// `description` and `due_date` allow clearing them. There is no way to touch
/// `id` or `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub completed: Option<bool>,
    pub favorite: Option<bool>,
    pub archived: Option<bool>,
    pub due_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// Merge the set fields into `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(favorite) = self.favorite {
            task.favorite = favorite;
        }
        if let Some(archived) = self.archived {
            task.archived = archived;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(tags) = &self.tags {
            task.tags = dedup_tags(tags.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Task {
        Task::from_new(
            NewTask::new("Write report"),
            7,
            Utc.with_ymd_and_hms(2025, 6, 18, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn new_task_defaults() {
        let t = sample();
        assert_eq!(t.priority, Priority::Medium);
        assert_eq!(t.category, "General");
        assert!(!t.completed && !t.favorite && !t.archived);
        assert!(t.tags.is_empty());
    }

    #[test]
    fn add_tag_ignores_blank_and_duplicates() {
        let mut t = sample();
        assert!(t.add_tag(" ui "));
        assert!(!t.add_tag("ui"));
        assert!(!t.add_tag("   "));
        assert!(t.add_tag("design"));
        assert_eq!(t.tags, vec!["ui".to_string(), "design".to_string()]);
    }

    #[test]
    fn from_new_dedups_tags() {
        let mut new = NewTask::new("x");
        new.tags = vec!["a".into(), "b".into(), "a".into()];
        let t = Task::from_new(new, 1, Utc::now());
        assert_eq!(t.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn overdue_requires_past_due_and_open() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let mut t = sample();
        assert!(!t.is_overdue(today));
        t.due_date = NaiveDate::from_ymd_opt(2025, 6, 20);
        assert!(t.is_overdue(today));
        t.due_date = Some(today);
        assert!(!t.is_overdue(today));
        t.due_date = NaiveDate::from_ymd_opt(2025, 6, 20);
        t.completed = true;
        assert!(!t.is_overdue(today));
    }

    #[test]
    fn search_covers_title_description_and_tags() {
        let mut t = sample();
        t.description = Some("Quarterly NUMBERS".into());
        t.add_tag("Finance");
        assert!(t.matches_search(""));
        assert!(t.matches_search("report"));
        assert!(t.matches_search("numbers"));
        assert!(t.matches_search("fin"));
        assert!(!t.matches_search("marketing"));
    }

    #[test]
    fn patch_leaves_unset_fields_alone() {
        let mut t = sample();
        t.due_date = NaiveDate::from_ymd_opt(2025, 7, 1);
        let before = t.clone();
        let patch = TaskPatch {
            priority: Some(Priority::High),
            tags: Some(vec!["x".into(), "x".into()]),
            ..TaskPatch::default()
        };
        patch.apply_to(&mut t);
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.tags, vec!["x".to_string()]);
        assert_eq!(t.title, before.title);
        assert_eq!(t.due_date, before.due_date);
        assert_eq!(t.created_at, before.created_at);

        TaskPatch { due_date: Some(None), ..TaskPatch::default() }.apply_to(&mut t);
        assert_eq!(t.due_date, None);
    }

    #[test]
    fn deserializes_web_export_shape() {
        let raw = r#"{
            "id": 1750000000000,
            "title": "Ship it",
            "description": "",
            "priority": "high",
            "category": "Development",
            "completed": false,
            "favorite": true,
            "archived": false,
            "dueDate": "",
            "createdAt": "2025-06-18T00:00:00.000Z",
            "tags": ["release"]
        }"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(t.id, 1_750_000_000_000);
        assert_eq!(t.due_date, None);
        assert_eq!(t.priority, Priority::High);
        assert_eq!(
            t.created_at,
            Utc.with_ymd_and_hms(2025, 6, 18, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn serializes_camel_case_keys() {
        let mut t = sample();
        t.due_date = NaiveDate::from_ymd_opt(2025, 6, 25);
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["dueDate"], "2025-06-25");
        assert_eq!(v["createdAt"], "2025-06-18T09:00:00Z");
        assert!(v.get("description").is_none());
    }
}
