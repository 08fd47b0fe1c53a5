//! JSON export and import of the whole task collection.
//!
//! Export writes a pretty-printed JSON array (2-space indent) through a temp
//! file that is renamed into place. Import parses the same shape, validates
//! it, and yields a `Load` action; invalid input is rejected as a whole.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::action::Action;
use crate::task::{dedup_tags, Task};

/// File name offered for exports when none is given.
pub const EXPORT_FILE_NAME: &str = "tasks.json";

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid task JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("task {id} has an empty title")]
    EmptyTitle { id: u64 },
    #[error("duplicate task id {0}")]
    DuplicateId(u64),
}

impl TransferError {
    fn io(path: &Path, source: io::Error) -> Self {
        TransferError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serialize the collection as pretty JSON.
pub fn to_json(tasks: &[Task]) -> Result<String, TransferError> {
    let mut data = serde_json::to_string_pretty(tasks)?;
    data.push('\n');
    Ok(data)
}

/// Write the collection to `path`, replacing any existing file atomically.
pub fn export_to(path: &Path, tasks: &[Task]) -> Result<(), TransferError> {
    let data = to_json(tasks)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TransferError::io(dir, e))?;
    if let Err(e) = tmp.write_all(data.as_bytes()).and_then(|_| tmp.flush()) {
        return Err(TransferError::io(tmp.path(), e));
    }
    tmp.persist(path)
        .map_err(|e| TransferError::io(path, e.error))?;
    info!(path = %path.display(), tasks = tasks.len(), "exported tasks");
    Ok(())
}

/// Parse and validate an exported collection.
///
/// Rejects duplicate ids and blank titles. Duplicate tags within a task are
/// collapsed rather than rejected.
pub fn from_json(data: &str) -> Result<Vec<Task>, TransferError> {
    let mut tasks: Vec<Task> = serde_json::from_str(data)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks.iter_mut() {
        if !seen.insert(task.id) {
            return Err(TransferError::DuplicateId(task.id));
        }
        if task.title.trim().is_empty() {
            return Err(TransferError::EmptyTitle { id: task.id });
        }
        let before = task.tags.len();
        task.tags = dedup_tags(std::mem::take(&mut task.tags));
        if task.tags.len() != before {
            debug!(id = task.id, "collapsed duplicate tags on import");
        }
    }
    Ok(tasks)
}

/// Read and validate a collection from `path`.
pub fn import_from(path: &Path) -> Result<Vec<Task>, TransferError> {
    let data = fs::read_to_string(path).map_err(|e| TransferError::io(path, e))?;
    let tasks = from_json(&data)?;
    info!(path = %path.display(), tasks = tasks.len(), "imported tasks");
    Ok(tasks)
}

/// A `Load` action replacing the collection with the file's contents.
pub fn load_action(path: &Path) -> Result<Action, TransferError> {
    import_from(path).map(Action::Load)
}
