//! Error types for to-do store operations.

use thiserror::Error;

/// Reasons a draft is refused before any state changes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,

    #[error("description is required")]
    EmptyDescription,
}

/// Errors surfaced by the task and image stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("task not found: {id}")]
    NotFound { id: String },

    #[error("failed to load tasks: {cause}")]
    Load { cause: String },

    #[error("failed to save tasks: {cause}")]
    Save { cause: String },

    #[error("failed to write image: {cause}")]
    ImageWrite { cause: String },

    #[error("failed to read image: {cause}")]
    ImageRead { cause: String },

    #[error("invalid configuration: {cause}")]
    Config { cause: String },
}

impl StoreError {
    pub fn not_found(id: impl ToString) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    pub fn load(cause: impl ToString) -> Self {
        Self::Load {
            cause: cause.to_string(),
        }
    }

    pub fn save(cause: impl ToString) -> Self {
        Self::Save {
            cause: cause.to_string(),
        }
    }

    pub fn image_write(cause: impl ToString) -> Self {
        Self::ImageWrite {
            cause: cause.to_string(),
        }
    }

    pub fn image_read(cause: impl ToString) -> Self {
        Self::ImageRead {
            cause: cause.to_string(),
        }
    }

    /// True for errors that leave persisted state untouched and only need the
    /// user to correct their input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias using [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
