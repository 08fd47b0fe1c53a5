//! State-transition requests understood by the task store.

use std::collections::BTreeSet;

use crate::task::{NewTask, Task, TaskPatch};

/// A discrete, named change to the task collection.
///
/// Every variant is total: ids that are not in the collection are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Append a new task; the store assigns its id and creation time.
    Add(NewTask),
    /// Flip `completed` on one task.
    ToggleComplete(u64),
    /// Remove one task.
    Delete(u64),
    /// Merge the set fields of a patch into one task.
    Update { id: u64, patch: TaskPatch },
    /// Flip `favorite` on one task.
    ToggleFavorite(u64),
    /// Flip `archived` on one task.
    ToggleArchive(u64),
    /// Remove every task whose id is in the set.
    BulkDelete(BTreeSet<u64>),
    /// Mark every task whose id is in the set as completed.
    BulkComplete(BTreeSet<u64>),
    /// Remove every completed task.
    ClearCompleted,
    /// Replace the whole collection.
    Load(Vec<Task>),
}

impl Action {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add(_) => "add",
            Action::ToggleComplete(_) => "toggle-complete",
            Action::Delete(_) => "delete",
            Action::Update { .. } => "update",
            Action::ToggleFavorite(_) => "toggle-favorite",
            Action::ToggleArchive(_) => "toggle-archive",
            Action::BulkDelete(_) => "bulk-delete",
            Action::BulkComplete(_) => "bulk-complete",
            Action::ClearCompleted => "clear-completed",
            Action::Load(_) => "load",
        }
    }
}
