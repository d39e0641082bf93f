//! The persisted to-do record.
//!
//! A [`Task`] is stored as one element of the JSON array in the data file.
//! Field names are camelCase on disk:
//!
//! ```json
//! {
//!   "id": "3f0c1a6e-8d43-4c1e-9a55-0b7c2f1e9d10",
//!   "title": "Buy milk",
//!   "description": "2 liters",
//!   "imageFileName": "b1d2c3e4-0000-4000-8000-000000000000.jpg",
//!   "isCompleted": false,
//!   "dueTime": "2024-10-22T15:05:00Z"
//! }
//! ```

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use crate::error::ValidationError;

/// Stable task identifier, assigned once at creation.
pub type TaskId = Uuid;

/// One to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    pub description: String,

    /// Name of a file owned by the image store, absent when no photo is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file_name: Option<String>,

    #[serde(default)]
    pub is_completed: bool,

    pub due_time: DateTime<Utc>,
}

impl Task {
    /// Build a fresh, not yet completed task from a validated draft.
    pub fn new(draft: TaskDraft, image_file_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            image_file_name,
            is_completed: false,
            due_time: draft.due_time,
        }
    }

    /// Overwrite the user-editable fields. The id, completion flag and image
    /// are left alone.
    pub fn apply(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.due_time = draft.due_time;
    }

    /// The editable fields of this task, e.g. to prefill an edit form.
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            due_time: self.due_time,
        }
    }

    /// Case-insensitive substring match on title or description.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }

    pub fn has_image(&self) -> bool {
        self.image_file_name.is_some()
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_completed {
            "Completed"
        } else {
            "Pending"
        }
    }

    /// Due time rendered in the local timezone, e.g. `Oct 22, 2024 at 3:05 PM`.
    pub fn due_label(&self) -> String {
        self.due_label_in(&Local)
    }

    pub fn due_label_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.due_time
            .with_timezone(tz)
            .format("%b %-d, %Y at %-I:%M %p")
            .to_string()
    }
}

/// The fields a user fills in when adding or editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due_time: DateTime<Utc>,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        due_time: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            due_time,
        }
    }

    /// Title is checked before description, so a draft with both missing
    /// reports [`ValidationError::EmptyTitle`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(())
    }
}
