//! Access checks for image sources

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use todo_core::PermissionDefaults;

/// Outcome of an access request. A dismissed prompt counts as `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

impl Access {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

impl From<bool> for Access {
    fn from(granted: bool) -> Self {
        if granted {
            Self::Granted
        } else {
            Self::Denied
        }
    }
}

/// Trait for asking the platform for camera / photo library access
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request_camera_access(&self) -> Access;

    async fn request_photo_library_access(&self) -> Access;
}

/// Fixed answers, typically read from the `[permissions]` config table
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissions {
    pub camera: Access,
    pub photo_library: Access,
}

impl StaticPermissions {
    pub fn new(camera: Access, photo_library: Access) -> Self {
        Self {
            camera,
            photo_library,
        }
    }
}

impl From<&PermissionDefaults> for StaticPermissions {
    fn from(defaults: &PermissionDefaults) -> Self {
        Self::new(defaults.camera.into(), defaults.photo_library.into())
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn request_camera_access(&self) -> Access {
        self.camera
    }

    async fn request_photo_library_access(&self) -> Access {
        self.photo_library
    }
}

/// Mock provider for testing; counts how often it was asked
#[derive(Debug)]
pub struct MockPermissions {
    camera: Access,
    photo_library: Access,
    requests: AtomicUsize,
}

impl MockPermissions {
    pub fn new(camera: Access, photo_library: Access) -> Self {
        Self {
            camera,
            photo_library,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granting() -> Self {
        Self::new(Access::Granted, Access::Granted)
    }

    pub fn denying() -> Self {
        Self::new(Access::Denied, Access::Denied)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionProvider for MockPermissions {
    async fn request_camera_access(&self) -> Access {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.camera
    }

    async fn request_photo_library_access(&self) -> Access {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.photo_library
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_from_config_defaults() {
        let permissions = StaticPermissions::from(&PermissionDefaults::default());
        assert_eq!(permissions.request_camera_access().await, Access::Denied);
        assert_eq!(
            permissions.request_photo_library_access().await,
            Access::Granted
        );
    }

    #[tokio::test]
    async fn test_mock_counts_requests() {
        let mock = MockPermissions::new(Access::Granted, Access::Denied);
        assert!(mock.request_camera_access().await.is_granted());
        assert!(!mock.request_photo_library_access().await.is_granted());
        assert_eq!(mock.requests(), 2);
    }
}
