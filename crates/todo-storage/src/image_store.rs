//! Image file storage for task photos.
//!
//! Each attached photo lives in its own `<uuid>.jpg` file inside one managed
//! directory. Tasks refer to an image only by that file name.

use std::path::{Path, PathBuf};
use todo_core::{Result, StoreError};
use tokio::fs;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Extension given to every stored image.
pub const IMAGE_EXTENSION: &str = "jpg";

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Directory of image files keyed by generated names.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// The directory is created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of `file_name` inside the managed directory, or `None` when
    /// the name could escape it.
    pub fn path_for(&self, file_name: &str) -> Option<PathBuf> {
        let plain = !file_name.is_empty()
            && file_name != "."
            && file_name != ".."
            && !file_name.contains(['/', '\\']);
        plain.then(|| self.dir.join(file_name))
    }

    /// Store `bytes` under a fresh name and return that name.
    #[instrument(skip(self, bytes), fields(dir = %self.dir.display(), len = bytes.len()))]
    pub async fn save(&self, bytes: &[u8]) -> Result<String> {
        if !is_jpeg(bytes) {
            return Err(StoreError::image_write("data is not a JPEG image"));
        }

        fs::create_dir_all(&self.dir).await.map_err(|e| {
            StoreError::image_write(format!("failed to create {}: {}", self.dir.display(), e))
        })?;

        let file_name = format!("{}.{}", Uuid::new_v4(), IMAGE_EXTENSION);
        let path = self.dir.join(&file_name);

        debug!("Writing image file: {}", path.display());
        fs::write(&path, bytes)
            .await
            .map_err(|e| StoreError::image_write(format!("{}: {}", path.display(), e)))?;

        Ok(file_name)
    }

    /// Read the bytes stored under `file_name`.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn load(&self, file_name: &str) -> Result<Vec<u8>> {
        let path = self
            .path_for(file_name)
            .ok_or_else(|| StoreError::image_read(format!("invalid image file name: {}", file_name)))?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::image_read(format!("image not found: {}", file_name)));
            }
            Err(e) => {
                return Err(StoreError::image_read(format!("{}: {}", path.display(), e)));
            }
        };

        if !is_jpeg(&bytes) {
            return Err(StoreError::image_read(format!(
                "corrupt image data in {}",
                file_name
            )));
        }

        Ok(bytes)
    }

    /// Remove the file stored under `file_name`.
    ///
    /// A file that is already gone counts as deleted.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn delete(&self, file_name: &str) -> Result<()> {
        let path = self
            .path_for(file_name)
            .ok_or_else(|| StoreError::image_write(format!("invalid image file name: {}", file_name)))?;

        debug!("Deleting image file: {}", path.display());
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Image file did not exist, nothing to delete");
                Ok(())
            }
            Err(e) => Err(StoreError::image_write(format!(
                "failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn exists(&self, file_name: &str) -> bool {
        match self.path_for(file_name) {
            Some(path) => fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }
}

fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SOI)
}
