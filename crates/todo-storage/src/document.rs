//! The persisted task document.
//!
//! The whole collection is stored as a single JSON array and rewritten in full
//! on every save. [`TaskDocument`] is the seam between the store and the
//! filesystem so tests can substitute a failing backend.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use todo_core::{Result, StoreError, Task};
use tokio::fs;
use tracing::debug;

/// Whole-document persistence for the task collection.
#[async_trait]
pub trait TaskDocument: Send + Sync {
    /// Read and decode every task.
    async fn read(&self) -> Result<Vec<Task>>;

    /// Replace the stored document with `tasks`.
    async fn write(&self, tasks: &[Task]) -> Result<()>;

    /// Human-readable location, used in log lines.
    fn location(&self) -> String;
}

/// JSON array on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TaskDocument for JsonDocument {
    async fn read(&self) -> Result<Vec<Task>> {
        debug!("Reading task document: {}", self.path.display());

        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::load(format!(
                    "no data file at {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(StoreError::load(format!("{}: {}", self.path.display(), e))),
        };

        let tasks: Vec<Task> = serde_json::from_slice(&data)
            .map_err(|e| StoreError::load(format!("malformed document: {}", e)))?;

        let mut seen = HashSet::with_capacity(tasks.len());
        if let Some(dup) = tasks.iter().find(|t| !seen.insert(t.id)) {
            return Err(StoreError::load(format!("duplicate task id {}", dup.id)));
        }

        Ok(tasks)
    }

    async fn write(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::save(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let data = serde_json::to_vec_pretty(tasks).map_err(StoreError::save)?;

        debug!(
            "Writing {} tasks to {}",
            tasks.len(),
            self.path.display()
        );
        fs::write(&self.path, data)
            .await
            .map_err(|e| StoreError::save(format!("{}: {}", self.path.display(), e)))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
