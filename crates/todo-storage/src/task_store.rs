//! The task store: in-memory collection with write-through persistence.
//!
//! The store owns the collection for the lifetime of the process. Every
//! mutation updates memory first and then rewrites the whole document; when a
//! write fails the in-memory copy stays authoritative for the session.

use std::path::Path;
use todo_core::{Result, StoreError, Task, TaskDraft, TaskId, TodoConfig};
use tracing::{debug, info, instrument, warn};

use crate::document::{JsonDocument, TaskDocument};
use crate::image_store::ImageStore;
use crate::search::{filter_tasks, search, TaskFilter};

/// Behavior switches for a [`TaskStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Delete the previous image file when an update attaches a new one.
    /// With `false` the old file is left orphaned on disk.
    pub delete_replaced_image: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            delete_replaced_image: true,
        }
    }
}

impl From<&TodoConfig> for StoreOptions {
    fn from(config: &TodoConfig) -> Self {
        Self {
            delete_replaced_image: config.delete_replaced_image,
        }
    }
}

/// Ordered task collection backed by a [`TaskDocument`] and an [`ImageStore`].
#[derive(Debug)]
pub struct TaskStore<D: TaskDocument = JsonDocument> {
    document: D,
    images: ImageStore,
    options: StoreOptions,
    tasks: Vec<Task>,
}

impl TaskStore<JsonDocument> {
    /// Store over the files configured for `data_dir`. Nothing is read until
    /// [`TaskStore::load`] is called.
    pub fn open(data_dir: &Path, config: &TodoConfig) -> Self {
        Self::new(
            JsonDocument::new(config.data_path(data_dir)),
            ImageStore::new(config.image_path(data_dir)),
            StoreOptions::from(config),
        )
    }
}

impl<D: TaskDocument> TaskStore<D> {
    /// Empty store; call [`TaskStore::load`] to pick up persisted tasks.
    pub fn new(document: D, images: ImageStore, options: StoreOptions) -> Self {
        Self {
            document,
            images,
            options,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn image_store(&self) -> &ImageStore {
        &self.images
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    /// Replace the in-memory collection with the persisted one. On failure the
    /// collection is left as it was.
    #[instrument(skip(self), fields(document = %self.document.location()))]
    pub async fn load(&mut self) -> Result<()> {
        let tasks = self.document.read().await?;
        debug!("Loaded {} tasks", tasks.len());
        self.tasks = tasks;
        Ok(())
    }

    /// Rewrite the whole document from memory.
    pub async fn save(&self) -> Result<()> {
        self.document.write(&self.tasks).await
    }

    /// Add a new task, storing `image` first when supplied.
    ///
    /// If the image cannot be stored the task is created without one.
    #[instrument(skip(self, draft, image), fields(has_image = image.is_some()))]
    pub async fn create(&mut self, draft: TaskDraft, image: Option<&[u8]>) -> Result<Task> {
        draft.validate()?;

        let image_file_name = match image {
            Some(bytes) => self.store_image(bytes).await,
            None => None,
        };

        let task = Task::new(draft, image_file_name);
        info!("Creating task {}", task.id);
        self.tasks.push(task.clone());
        self.save().await?;

        Ok(task)
    }

    /// Replace the editable fields of task `id`, and its image when `image`
    /// is supplied.
    #[instrument(skip(self, draft, image), fields(has_image = image.is_some()))]
    pub async fn update(
        &mut self,
        id: TaskId,
        draft: TaskDraft,
        image: Option<&[u8]>,
    ) -> Result<Task> {
        draft.validate()?;
        let index = self.position(id)?;

        let new_image = match image {
            Some(bytes) => self.store_image(bytes).await,
            None => None,
        };

        let task = &mut self.tasks[index];
        task.apply(draft);
        let replaced = match new_image {
            Some(name) => task.image_file_name.replace(name),
            None => None,
        };
        let task = task.clone();

        self.save().await?;

        // Only after the document stopped referencing it.
        if let Some(old) = replaced {
            if self.options.delete_replaced_image {
                self.discard_image(&old).await;
            } else {
                debug!("Leaving replaced image {} on disk", old);
            }
        }

        Ok(task)
    }

    /// Flip the completion flag of task `id`.
    ///
    /// If the write fails, only this task's flag is re-synced from the
    /// document; other tasks keep their in-memory state, including ones whose
    /// own saves failed earlier. The write error is still returned.
    #[instrument(skip(self))]
    pub async fn toggle_completion(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.is_completed = !task.is_completed;
        let task = task.clone();

        if let Err(err) = self.save().await {
            warn!(
                "Saving toggle of {} failed, re-syncing its flag from {}",
                id,
                self.document.location()
            );
            self.resync_completion(id).await;
            return Err(err);
        }

        Ok(task)
    }

    /// Copy the persisted completion flag of `id` back into memory.
    ///
    /// A task that was never persisted, or an unreadable document, leaves
    /// memory untouched.
    async fn resync_completion(&mut self, id: TaskId) {
        let persisted = match self.document.read().await {
            Ok(persisted) => persisted,
            Err(err) => {
                warn!("Re-sync failed, keeping in-memory state: {}", err);
                return;
            }
        };

        let Some(on_disk) = persisted.iter().find(|t| t.id == id) else {
            debug!("Task {} is not persisted yet, keeping in-memory flag", id);
            return;
        };
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.is_completed = on_disk.is_completed;
        }
    }

    /// Remove task `id` and, best-effort, its image file.
    ///
    /// The image is removed only after the document save succeeds, so the
    /// persisted copy never references a missing file.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id)?;
        let task = self.tasks.remove(index);
        info!("Deleting task {}", id);

        if let Err(err) = self.save().await {
            warn!("Saving delete of {} failed, keeping its image", id);
            return Err(err);
        }

        if let Some(name) = &task.image_file_name {
            self.discard_image(name).await;
        }

        Ok(task)
    }

    /// Detach and delete the image of task `id`, if it has one.
    #[instrument(skip(self))]
    pub async fn clear_image(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        let Some(old) = task.image_file_name.take() else {
            return Ok(task.clone());
        };
        let task = task.clone();

        self.save().await?;
        self.discard_image(&old).await;

        Ok(task)
    }

    /// Bytes of the image attached to task `id`. Any read failure is treated
    /// as "no image available".
    pub async fn image_for(&self, id: TaskId) -> Option<Vec<u8>> {
        let name = self.get(id)?.image_file_name.as_deref()?;
        match self.images.load(name).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("No image available for {}: {}", id, e);
                None
            }
        }
    }

    /// Tasks whose title or description contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Task> {
        search(&self.tasks, query)
    }

    pub fn filter(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter_tasks(&self.tasks, filter)
    }

    fn position(&self, id: TaskId) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn store_image(&self, bytes: &[u8]) -> Option<String> {
        match self.images.save(bytes).await {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("Continuing without image: {}", e);
                None
            }
        }
    }

    async fn discard_image(&self, name: &str) {
        if let Err(e) = self.images.delete(name).await {
            warn!("Failed to delete image {}: {}", name, e);
        }
    }
}
