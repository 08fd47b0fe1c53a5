//! Enumerations and field types for the task board.
//!
//! This module defines the structured values used to categorise tasks and to
//! drive the list view: priorities, well-known categories, sort keys, filters
//! and the navigation views that preset them.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Category assigned to new tasks when none is chosen.
pub const DEFAULT_CATEGORY: &str = "General";

/// Categories offered by the add/edit form. Any other text is accepted too.
pub const KNOWN_CATEGORIES: [&str; 4] = ["General", "Design", "Development", "Marketing"];

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl Priority {
    /// Sort rank, higher is more important.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Available sorting options for the task list.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Created,
    /// High, then medium, then low.
    Priority,
    /// Earliest due date first, undated tasks last.
    DueDate,
    /// Alphabetical by title.
    Title,
}

/// Which tasks the list shows, on top of search and archive visibility.
///
/// String forms are the fixed keywords, a priority name, or otherwise a
/// category label. A task whose category equals the string also matches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterBy {
    #[default]
    All,
    Completed,
    Pending,
    Favorites,
    Overdue,
    Priority(Priority),
    Category(String),
}

impl FromStr for FilterBy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "all" => FilterBy::All,
            "completed" => FilterBy::Completed,
            "pending" => FilterBy::Pending,
            "favorites" => FilterBy::Favorites,
            "overdue" => FilterBy::Overdue,
            "low" => FilterBy::Priority(Priority::Low),
            "medium" => FilterBy::Priority(Priority::Medium),
            "high" => FilterBy::Priority(Priority::High),
            other => FilterBy::Category(other.to_string()),
        })
    }
}

impl FilterBy {
    /// The string form of this filter.
    pub fn label(&self) -> &str {
        match self {
            FilterBy::All => "all",
            FilterBy::Completed => "completed",
            FilterBy::Pending => "pending",
            FilterBy::Favorites => "favorites",
            FilterBy::Overdue => "overdue",
            FilterBy::Priority(p) => p.as_str(),
            FilterBy::Category(c) => c,
        }
    }
}

impl fmt::Display for FilterBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Navigation destinations. Switching to one presets the filter and the
/// archive visibility of the list view.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum NavView {
    #[default]
    Dashboard,
    Tasks,
    Favorites,
    Archive,
    Stats,
}

impl NavView {
    pub fn label(self) -> &'static str {
        match self {
            NavView::Dashboard => "Dashboard",
            NavView::Tasks => "Tasks",
            NavView::Favorites => "Favorites",
            NavView::Archive => "Archive",
            NavView::Stats => "Statistics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_keywords_priorities_and_categories() {
        assert_eq!("all".parse::<FilterBy>().unwrap(), FilterBy::All);
        assert_eq!("overdue".parse::<FilterBy>().unwrap(), FilterBy::Overdue);
        assert_eq!(
            "high".parse::<FilterBy>().unwrap(),
            FilterBy::Priority(Priority::High)
        );
        assert_eq!(
            "Design".parse::<FilterBy>().unwrap(),
            FilterBy::Category("Design".into())
        );
    }

    #[test]
    fn filter_display_matches_parse_input() {
        for raw in ["all", "pending", "favorites", "low", "Marketing"] {
            let f: FilterBy = raw.parse().unwrap();
            assert_eq!(f.to_string(), raw);
        }
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        let p: Priority = serde_json::from_str("\"Low\"").unwrap();
        assert_eq!(p, Priority::Low);
    }
}
