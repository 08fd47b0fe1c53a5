//! View projection: the filtered, sorted list and the aggregate counters
//! derived from the task collection and explicit view state.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use feruca::Collator;
use serde::Serialize;
use tracing::trace;

use crate::action::Action;
use crate::fields::{FilterBy, SortKey};
use crate::task::Task;

/// The list settings the user controls. Passed explicitly to `project`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub filter: FilterBy,
    pub sort: SortKey,
    /// Archived and active tasks are separate display modes: when set only
    /// archived tasks are listed, otherwise only non-archived ones.
    pub show_archived: bool,
}

impl ViewState {
    /// Whether `task` passes archive visibility, search and filter.
    pub fn matches(&self, task: &Task, needle: &str, today: NaiveDate) -> bool {
        if task.archived != self.show_archived {
            return false;
        }
        if !task.matches_search(needle) {
            return false;
        }
        let by_keyword = match &self.filter {
            FilterBy::All => true,
            FilterBy::Completed => task.completed,
            FilterBy::Pending => !task.completed,
            FilterBy::Favorites => task.favorite,
            FilterBy::Overdue => task.is_overdue(today),
            FilterBy::Priority(p) => task.priority == *p,
            FilterBy::Category(_) => false,
        };
        // Any filter value also matches a category spelled the same way.
        by_keyword || task.category == self.filter.label()
    }
}

/// Tasks visible under `view`, in the view's sort order.
///
/// Sorting is stable: tasks with equal keys keep their collection order.
pub fn project<'a>(tasks: &'a [Task], view: &ViewState, today: NaiveDate) -> Vec<&'a Task> {
    let needle = view.search.to_lowercase();
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| view.matches(t, &needle, today))
        .collect();
    sort_tasks(&mut visible, view.sort);
    trace!(
        total = tasks.len(),
        visible = visible.len(),
        filter = %view.filter,
        "projected"
    );
    visible
}

/// Order tasks in place by `key`.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    match key {
        SortKey::Created => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Priority => tasks.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortKey::DueDate => tasks.sort_by(|a, b| cmp_due(a.due_date, b.due_date)),
        SortKey::Title => {
            let mut collator = Collator::default();
            tasks.sort_by(|a, b| collator.collate(a.title.as_str(), b.title.as_str()));
        }
    }
}

/// Earliest first; tasks without a due date go last.
fn cmp_due(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Aggregate counters over the whole collection, independent of the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub favorites: usize,
    pub overdue: usize,
    pub archived: usize,
}

impl Stats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let mut s = Stats::default();
        for t in tasks {
            if t.archived {
                s.archived += 1;
                continue;
            }
            s.total += 1;
            if t.completed {
                s.completed += 1;
            } else {
                s.pending += 1;
            }
            if t.favorite {
                s.favorites += 1;
            }
            if t.is_overdue(today) {
                s.overdue += 1;
            }
        }
        s
    }

    /// Completed share of non-archived tasks, as a whole percentage.
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u32
    }
}

/// Ids picked for a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<u64>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.ids.iter().copied()
    }

    /// Add `id` if absent, remove it if present. Returns whether it is now
    /// selected.
    pub fn toggle(&mut self, id: u64) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select every task in `visible`.
    pub fn select_all(&mut self, visible: &[&Task]) {
        self.ids.extend(visible.iter().map(|t| t.id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that no longer exist in `tasks`.
    pub fn retain_existing(&mut self, tasks: &[Task]) {
        self.ids.retain(|id| tasks.iter().any(|t| t.id == *id));
    }

    /// A bulk delete over the selection, or `None` when nothing is selected.
    pub fn bulk_delete(&self) -> Option<Action> {
        (!self.is_empty()).then(|| Action::BulkDelete(self.ids.clone()))
    }

    /// A bulk complete over the selection, or `None` when nothing is selected.
    pub fn bulk_complete(&self) -> Option<Action> {
        (!self.is_empty()).then(|| Action::BulkComplete(self.ids.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Priority;
    use crate::store::initial_tasks;
    use crate::task::NewTask;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 21).unwrap()
    }

    fn task(id: u64, title: &str, priority: Priority) -> Task {
        let mut new = NewTask::new(title);
        new.priority = priority;
        Task::from_new(
            new,
            id,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap() + Duration::hours(id as i64),
        )
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn default_view_sorts_newest_first_and_hides_archived() {
        let mut tasks = initial_tasks();
        tasks.push(task(3, "Archived", Priority::Low));
        tasks[2].archived = true;
        let out = project(&tasks, &ViewState::default(), today());
        assert_eq!(
            titles(&out),
            vec!["Design new landing page", "Review code changes"]
        );
    }

    #[test]
    fn archived_view_shows_only_archived() {
        let mut tasks = initial_tasks();
        tasks[1].archived = true;
        let view = ViewState {
            show_archived: true,
            ..ViewState::default()
        };
        let out = project(&tasks, &view, today());
        assert_eq!(titles(&out), vec!["Review code changes"]);
    }

    #[test]
    fn search_is_case_insensitive_over_tags_and_description() {
        let tasks = initial_tasks();
        let mut view = ViewState {
            search: "URGENT".into(),
            ..ViewState::default()
        };
        assert_eq!(titles(&project(&tasks, &view, today())), vec!["Design new landing page"]);
        view.search = "pull requests".into();
        assert_eq!(titles(&project(&tasks, &view, today())), vec!["Review code changes"]);
        view.search = "nothing like this".into();
        assert!(project(&tasks, &view, today()).is_empty());
    }

    #[test]
    fn filters_by_status_priority_and_category() {
        let tasks = initial_tasks();
        let cases = [
            ("completed", vec!["Review code changes"]),
            ("pending", vec!["Design new landing page"]),
            ("favorites", vec!["Review code changes"]),
            ("high", vec!["Design new landing page"]),
            ("low", vec![]),
            ("Development", vec!["Review code changes"]),
            ("development", vec![]),
        ];
        for (raw, expected) in cases {
            let view = ViewState {
                filter: raw.parse().unwrap(),
                ..ViewState::default()
            };
            assert_eq!(titles(&project(&tasks, &view, today())), expected, "filter {raw}");
        }
    }

    #[test]
    fn keyword_filters_also_match_same_named_category() {
        let mut tasks = initial_tasks();
        tasks.push(task(3, "Triage", Priority::Low));
        tasks[2].category = "high".into();
        let view = ViewState {
            filter: "high".parse().unwrap(),
            ..ViewState::default()
        };
        assert_eq!(
            titles(&project(&tasks, &view, today())),
            vec!["Design new landing page", "Triage"]
        );
    }

    #[test]
    fn search_term_is_not_trimmed() {
        let mut tasks = initial_tasks();
        tasks.push(task(3, "Deploy", Priority::Low));
        let view = ViewState {
            search: " ".into(),
            ..ViewState::default()
        };
        let out = project(&tasks, &view, today());
        assert!(out.iter().all(|t| t.title != "Deploy"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn overdue_filter_tracks_completion_without_reordering() {
        let mut tasks = initial_tasks();
        tasks[0].due_date = Some(today() - Duration::days(1));
        let view = ViewState {
            filter: FilterBy::Overdue,
            ..ViewState::default()
        };
        assert_eq!(titles(&project(&tasks, &view, today())), vec!["Design new landing page"]);

        tasks[0].completed = true;
        assert!(project(&tasks, &view, today()).is_empty());
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[1].id, 2);
    }

    #[test]
    fn priority_sort_is_high_medium_low_and_stable() {
        let tasks = vec![
            task(1, "low", Priority::Low),
            task(2, "high-a", Priority::High),
            task(3, "medium", Priority::Medium),
            task(4, "high-b", Priority::High),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut refs, SortKey::Priority);
        assert_eq!(titles(&refs), vec!["high-a", "high-b", "medium", "low"]);
    }

    #[test]
    fn due_sort_puts_undated_last() {
        let mut tasks = vec![
            task(1, "none", Priority::Low),
            task(2, "late", Priority::Low),
            task(3, "early", Priority::Low),
        ];
        tasks[1].due_date = NaiveDate::from_ymd_opt(2025, 7, 1);
        tasks[2].due_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        let mut refs: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut refs, SortKey::DueDate);
        assert_eq!(titles(&refs), vec!["early", "late", "none"]);
    }

    #[test]
    fn title_sort_uses_collation_order() {
        let tasks = vec![
            task(1, "Zebra", Priority::Low),
            task(2, "Élan", Priority::Low),
            task(3, "apple", Priority::Low),
            task(4, "Apple", Priority::Low),
            task(5, "eagle", Priority::Low),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        sort_tasks(&mut refs, SortKey::Title);
        assert_eq!(titles(&refs), vec!["apple", "Apple", "eagle", "Élan", "Zebra"]);
    }

    #[test]
    fn stats_count_over_full_collection() {
        let mut tasks = initial_tasks();
        tasks.push(task(3, "old", Priority::Low));
        tasks[2].archived = true;
        tasks[0].due_date = Some(today() - Duration::days(2));
        let view = ViewState {
            search: "review".into(),
            ..ViewState::default()
        };
        // The view narrows the list but not the counters.
        assert_eq!(project(&tasks, &view, today()).len(), 1);
        assert_eq!(
            Stats::compute(&tasks, today()),
            Stats {
                total: 2,
                completed: 1,
                pending: 1,
                favorites: 1,
                overdue: 1,
                archived: 1,
            }
        );
        assert_eq!(Stats::compute(&tasks, today()).completion_percent(), 50);
    }

    #[test]
    fn selection_builds_bulk_actions() {
        let tasks = initial_tasks();
        let mut sel = Selection::default();
        assert_eq!(sel.bulk_delete(), None);
        assert!(sel.toggle(2));
        assert!(sel.toggle(1));
        assert!(!sel.toggle(1));
        assert_eq!(
            sel.bulk_complete(),
            Some(Action::BulkComplete([2].into_iter().collect()))
        );
        let visible: Vec<&Task> = tasks.iter().collect();
        sel.select_all(&visible);
        assert_eq!(sel.len(), 2);
        sel.retain_existing(&tasks[..1]);
        assert_eq!(sel.ids().collect::<Vec<_>>(), vec![1]);
    }
}
