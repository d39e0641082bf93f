//! User-facing messages for store outcomes.
//!
//! Store operations return [`StoreError`]; front ends turn those (and
//! successes) into an [`Alert`] rather than formatting messages themselves.

use serde::Serialize;
use std::fmt;

use crate::error::{StoreError, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn saved() -> Self {
        Self::new(AlertLevel::Success, "ToDo", "To-Do saved successfully.")
    }

    pub fn deleted() -> Self {
        Self::new(AlertLevel::Success, "Delete To-Do", "To-Do deleted.")
    }

    pub fn permission_denied() -> Self {
        Self::new(
            AlertLevel::Error,
            "Permission Denied",
            "Please enable camera or photo library access in Settings.",
        )
    }

    pub fn image_dropped() -> Self {
        Self::new(
            AlertLevel::Info,
            "Image",
            "The image could not be stored; the To-Do was saved without it.",
        )
    }

    pub fn is_error(&self) -> bool {
        self.level == AlertLevel::Error
    }
}

impl From<&StoreError> for Alert {
    fn from(err: &StoreError) -> Self {
        let message = match err {
            StoreError::Validation(ValidationError::EmptyTitle) => "Title is required.".to_string(),
            StoreError::Validation(ValidationError::EmptyDescription) => {
                "Description is required.".to_string()
            }
            StoreError::NotFound { id } => format!("To-Do not found: {}", id),
            StoreError::Load { cause } => format!("Error loading todos: {}", cause),
            StoreError::Save { .. } => "Failed to save todos.".to_string(),
            StoreError::ImageWrite { cause } => format!("Image could not be saved: {}", cause),
            StoreError::ImageRead { cause } => format!("Image could not be loaded: {}", cause),
            StoreError::Config { cause } => format!("Configuration error: {}", cause),
        };
        Self::new(AlertLevel::Error, "Alert", message)
    }
}

impl From<StoreError> for Alert {
    fn from(err: StoreError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let alert = Alert::from(StoreError::from(ValidationError::EmptyTitle));
        assert_eq!(alert.message, "Title is required.");
        assert!(alert.is_error());

        let alert = Alert::from(StoreError::from(ValidationError::EmptyDescription));
        assert_eq!(alert.message, "Description is required.");
    }

    #[test]
    fn test_io_messages() {
        assert_eq!(
            Alert::from(StoreError::save("permission denied")).message,
            "Failed to save todos."
        );
        assert_eq!(
            Alert::from(StoreError::load("no such file")).message,
            "Error loading todos: no such file"
        );
    }

    #[test]
    fn test_success_alerts() {
        let alert = Alert::saved();
        assert!(!alert.is_error());
        assert_eq!(alert.to_string(), "ToDo: To-Do saved successfully.");
    }
}
