//! The task store: the ordered task collection and its single transition
//! entry point.
//!
//! `reduce` is the pure transition function. `TaskStore` wraps it, owns the
//! collection, and hands out ids that stay unique for the whole session.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::action::Action;
use crate::fields::Priority;
use crate::task::Task;

/// Identity handed to a task created by `Action::Add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub id: u64,
    pub created_at: DateTime<Utc>,
}

/// Apply `action` to `tasks` and return the next collection.
///
/// Never fails. Ids that do not match any task are ignored. `stamp` is only
/// read by `Action::Add`.
pub fn reduce(tasks: &[Task], action: Action, stamp: Stamp) -> Vec<Task> {
    match action {
        Action::Add(new) => {
            let mut next = Vec::with_capacity(tasks.len() + 1);
            next.extend_from_slice(tasks);
            next.push(Task::from_new(new, stamp.id, stamp.created_at));
            next
        }
        Action::ToggleComplete(id) => map_task(tasks, id, |t| t.completed = !t.completed),
        Action::Delete(id) => tasks.iter().filter(|t| t.id != id).cloned().collect(),
        Action::Update { id, patch } => map_task(tasks, id, |t| patch.apply_to(t)),
        Action::ToggleFavorite(id) => map_task(tasks, id, |t| t.favorite = !t.favorite),
        Action::ToggleArchive(id) => map_task(tasks, id, |t| t.archived = !t.archived),
        Action::BulkDelete(ids) => tasks
            .iter()
            .filter(|t| !ids.contains(&t.id))
            .cloned()
            .collect(),
        Action::BulkComplete(ids) => tasks
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if ids.contains(&t.id) {
                    t.completed = true;
                }
                t
            })
            .collect(),
        Action::ClearCompleted => tasks.iter().filter(|t| !t.completed).cloned().collect(),
        Action::Load(replacement) => replacement,
    }
}

fn map_task(tasks: &[Task], id: u64, f: impl Fn(&mut Task)) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == id {
                f(&mut t);
            }
            t
        })
        .collect()
}

/// Outcome of a dispatch, for feedback and logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatched {
    /// Id of the task created by an `Add`.
    pub added: Option<u64>,
    /// Number of task records that were created, removed or modified.
    pub changed: usize,
}

/// Owner of the authoritative task collection.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    /// Highest id ever issued or held, so deleted ids are never reused.
    last_id: u64,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        Self { tasks, last_id }
    }

    /// A store holding the two sample tasks a fresh board starts with.
    pub fn seeded() -> Self {
        Self::new(initial_tasks())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Generate the id the next `Add` would receive at `now`: the Unix time
    /// in milliseconds, bumped past every id already issued. Once the id
    /// space above the high-water mark is used up, the smallest id no task
    /// holds is reused instead.
    pub fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match self.last_id.checked_add(1) {
            Some(next) => millis.max(next),
            None => self.smallest_free_id(),
        }
    }

    fn smallest_free_id(&self) -> u64 {
        let held: BTreeSet<u64> = self.tasks.iter().map(|t| t.id).collect();
        (1..=u64::MAX).find(|id| !held.contains(id)).unwrap_or(0)
    }

    /// Apply an action, replacing the collection in one step.
    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Dispatched {
        let name = action.name();
        let stamp = Stamp {
            id: self.next_id(now),
            created_at: now,
        };
        let is_add = matches!(action, Action::Add(_));
        let is_load = matches!(action, Action::Load(_));

        let next = reduce(&self.tasks, action, stamp);
        let changed = if is_load {
            next.len()
        } else {
            count_changes(&self.tasks, &next)
        };
        self.tasks = next;

        let added = if is_add {
            self.last_id = self.last_id.max(stamp.id);
            Some(stamp.id)
        } else {
            None
        };
        if is_load {
            let max_loaded = self.tasks.iter().map(|t| t.id).max().unwrap_or(0);
            self.last_id = self.last_id.max(max_loaded);
        }

        if changed == 0 {
            debug!(action = name, "dispatch left the collection unchanged");
        } else {
            debug!(action = name, changed, total = self.tasks.len(), "dispatched");
        }
        Dispatched { added, changed }
    }
}

/// Records that differ between two collections. Every action either keeps
/// the length and edits in place or only removes/appends, so a length
/// difference is the number of records removed or added.
fn count_changes(before: &[Task], after: &[Task]) -> usize {
    if before.len() != after.len() {
        return before.len().abs_diff(after.len());
    }
    before.iter().zip(after).filter(|(a, b)| a != b).count()
}

/// The two sample tasks a new board is seeded with.
pub fn initial_tasks() -> Vec<Task> {
    vec![
        Task {
            id: 1,
            title: "Design new landing page".into(),
            description: Some(
                "Create wireframes and mockups for the new product landing page".into(),
            ),
            priority: Priority::High,
            category: "Design".into(),
            completed: false,
            favorite: false,
            archived: false,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 25),
            created_at: midnight_utc(2025, 6, 18),
            tags: vec!["ui".into(), "design".into(), "urgent".into()],
        },
        Task {
            id: 2,
            title: "Review code changes".into(),
            description: Some("Review pull requests from the development team".into()),
            priority: Priority::Medium,
            category: "Development".into(),
            completed: true,
            favorite: true,
            archived: false,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 20),
            created_at: midnight_utc(2025, 6, 17),
            tags: vec!["code".into(), "review".into()],
        },
    ]
}

fn midnight_utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}
