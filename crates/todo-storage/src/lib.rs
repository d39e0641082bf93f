//! Todo Storage - local persistence for the to-do list
//!
//! This crate owns the task collection and everything it keeps on disk.
//!
//! # Overview
//!
//! - [`TaskStore`]: in-memory collection, CRUD, search/filter
//! - [`JsonDocument`]: the whole collection as one JSON array, rewritten on
//!   every mutation
//! - [`ImageStore`]: one `<uuid>.jpg` file per attached photo
//!
//! # Layout
//!
//! ```text
//! .todo/
//! ├── config.toml
//! ├── todos.json        <- JsonDocument
//! └── images/           <- ImageStore
//!     └── 7d0e...c1.jpg
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use chrono::Utc;
//! use todo_core::{TaskDraft, TodoConfig};
//! use todo_storage::TaskStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let data_dir = Path::new(".todo");
//! let config = TodoConfig::load_or_default(data_dir)?;
//!
//! let mut store = TaskStore::open(data_dir, &config);
//! store.load().await?;
//!
//! let task = store
//!     .create(TaskDraft::new("Buy milk", "2 liters", Utc::now()), None)
//!     .await?;
//! store.toggle_completion(task.id).await?;
//!
//! for task in store.search("milk") {
//!     println!("{} [{}]", task.title, task.status_label());
//! }
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod image_store;
pub mod search;
pub mod task_store;

pub use document::{JsonDocument, TaskDocument};
pub use image_store::{ImageStore, IMAGE_EXTENSION};
pub use search::{filter_tasks, search, StatusFilter, TaskFilter};
pub use task_store::{StoreOptions, TaskStore};
