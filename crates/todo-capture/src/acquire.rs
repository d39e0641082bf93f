//! Permission-gated image acquisition

use todo_core::{Alert, Result};
use tracing::{debug, info};

use crate::permission::PermissionProvider;
use crate::picker::{ImagePicker, ImageSource, Picked};

/// Result of trying to get an image for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    Image(Vec<u8>),
    Cancelled,
    PermissionDenied,
}

impl Acquisition {
    /// Bytes to hand to the task store; `None` means "proceed without image".
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Image(bytes) => Some(bytes),
            Self::Cancelled | Self::PermissionDenied => None,
        }
    }

    /// Message the caller should show, if any.
    pub fn alert(&self) -> Option<Alert> {
        match self {
            Self::PermissionDenied => Some(Alert::permission_denied()),
            Self::Image(_) | Self::Cancelled => None,
        }
    }
}

/// Ask for access to `source` and, only if granted, run the picker.
pub async fn acquire_image<P, I>(permissions: &P, picker: &I, source: ImageSource) -> Result<Acquisition>
where
    P: PermissionProvider + ?Sized,
    I: ImagePicker + ?Sized,
{
    let access = match source {
        ImageSource::Camera => permissions.request_camera_access().await,
        ImageSource::PhotoLibrary => permissions.request_photo_library_access().await,
    };

    if !access.is_granted() {
        info!("Access to {} denied, continuing without image", source);
        return Ok(Acquisition::PermissionDenied);
    }

    match picker.pick(source).await? {
        Picked::Image(bytes) => {
            debug!("Picked {} bytes from {}", bytes.len(), source);
            Ok(Acquisition::Image(bytes))
        }
        Picked::Cancelled => Ok(Acquisition::Cancelled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{Access, MockPermissions};
    use crate::picker::MockPicker;

    #[tokio::test]
    async fn test_granted_returns_image() {
        let permissions = MockPermissions::granting();
        let picker = MockPicker::returning(vec![0xFF, 0xD8]);

        let result = acquire_image(&permissions, &picker, ImageSource::Camera)
            .await
            .unwrap();

        assert_eq!(result, Acquisition::Image(vec![0xFF, 0xD8]));
        assert!(result.alert().is_none());
        assert_eq!(picker.calls(), 1);
    }

    #[tokio::test]
    async fn test_denied_skips_picker() {
        let permissions = MockPermissions::denying();
        let picker = MockPicker::returning(vec![0xFF, 0xD8]);

        let result = acquire_image(&permissions, &picker, ImageSource::PhotoLibrary)
            .await
            .unwrap();

        assert_eq!(result, Acquisition::PermissionDenied);
        assert_eq!(picker.calls(), 0);
        assert_eq!(permissions.requests(), 1);
        assert_eq!(
            result.alert().map(|a| a.title),
            Some("Permission Denied".to_string())
        );
        assert!(result.into_bytes().is_none());
    }

    #[tokio::test]
    async fn test_permission_is_per_source() {
        let permissions = MockPermissions::new(Access::Denied, Access::Granted);
        let picker = MockPicker::returning(vec![0xFF, 0xD8]);

        let camera = acquire_image(&permissions, &picker, ImageSource::Camera)
            .await
            .unwrap();
        let library = acquire_image(&permissions, &picker, ImageSource::PhotoLibrary)
            .await
            .unwrap();

        assert_eq!(camera, Acquisition::PermissionDenied);
        assert_eq!(library.into_bytes(), Some(vec![0xFF, 0xD8]));
    }

    #[tokio::test]
    async fn test_cancelled() {
        let permissions = MockPermissions::granting();
        let picker = MockPicker::cancelling();

        let result = acquire_image(&permissions, &picker, ImageSource::PhotoLibrary)
            .await
            .unwrap();

        assert_eq!(result, Acquisition::Cancelled);
        assert!(result.alert().is_none());
    }
}
