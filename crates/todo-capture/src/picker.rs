//! Image pickers: where the raw bytes come from

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use todo_core::{Result, StoreError};
use tracing::debug;

/// Where an image should be taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    PhotoLibrary,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::PhotoLibrary => write!(f, "photo library"),
        }
    }
}

/// What the picker handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picked {
    Image(Vec<u8>),
    Cancelled,
}

/// Trait for the capture / selection UI (allows mocking in tests)
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick(&self, source: ImageSource) -> Result<Picked>;
}

/// Picker that reads an existing file per source.
///
/// A source with no file configured behaves like a cancelled picker.
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    camera: Option<PathBuf>,
    photo_library: Option<PathBuf>,
}

impl FilePicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camera_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.camera = Some(path.into());
        self
    }

    pub fn with_library_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.photo_library = Some(path.into());
        self
    }
}

#[async_trait]
impl ImagePicker for FilePicker {
    async fn pick(&self, source: ImageSource) -> Result<Picked> {
        let path = match source {
            ImageSource::Camera => &self.camera,
            ImageSource::PhotoLibrary => &self.photo_library,
        };
        let Some(path) = path else {
            debug!("No file for {}, treating as cancelled", source);
            return Ok(Picked::Cancelled);
        };

        debug!("Reading image from {}", path.display());
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::image_read(format!("{}: {}", path.display(), e)))?;
        Ok(Picked::Image(bytes))
    }
}

/// Mock picker for testing
#[derive(Debug)]
pub struct MockPicker {
    response: Picked,
    calls: AtomicUsize,
}

impl MockPicker {
    pub fn returning(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Picked::Image(bytes.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn cancelling() -> Self {
        Self {
            response: Picked::Cancelled,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImagePicker for MockPicker {
    async fn pick(&self, _source: ImageSource) -> Result<Picked> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
