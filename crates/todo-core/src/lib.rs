//! Core types for the local to-do store.
//!
//! This crate holds the data model shared by the storage layer, the image
//! capture collaborators and the CLI:
//!
//! - [`Task`] / [`TaskDraft`]: the persisted record and its user-editable fields
//! - [`StoreError`] / [`ValidationError`]: every failure a store operation reports
//! - [`Alert`]: user-facing wording for outcomes
//! - [`TodoConfig`]: `config.toml` in the data directory

pub mod alert;
pub mod config;
pub mod error;
pub mod task;

pub use alert::{Alert, AlertLevel};
pub use config::{PermissionDefaults, TodoConfig};
pub use error::{Result, StoreError, ValidationError};
pub use task::{Task, TaskDraft, TaskId};
