//! Configuration for a to-do data directory.
//!
//! Loaded from `config.toml` inside the data directory. Every field has a
//! default, so a missing file or a partial file are both fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Result, StoreError};

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// JSON document holding every task, relative to the data directory
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Directory holding attached images, relative to the data directory
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Delete the previous image file when an update attaches a new one
    #[serde(default = "default_delete_replaced_image")]
    pub delete_replaced_image: bool,

    /// Answers given when an image source asks for access
    #[serde(default)]
    pub permissions: PermissionDefaults,
}

/// Static access decisions for image sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefaults {
    #[serde(default)]
    pub camera: bool,

    #[serde(default = "default_photo_library")]
    pub photo_library: bool,
}

fn default_data_file() -> String {
    "todos.json".to_string()
}

fn default_image_dir() -> String {
    "images".to_string()
}

fn default_delete_replaced_image() -> bool {
    true
}

fn default_photo_library() -> bool {
    true
}

impl Default for PermissionDefaults {
    fn default() -> Self {
        Self {
            camera: false,
            photo_library: default_photo_library(),
        }
    }
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            image_dir: default_image_dir(),
            delete_replaced_image: default_delete_replaced_image(),
            permissions: PermissionDefaults::default(),
        }
    }
}

impl TodoConfig {
    /// Load `config.toml` from the data directory, or fall back to defaults.
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| StoreError::Config {
            cause: format!("failed to read {}: {}", config_path.display(), e),
        })?;
        toml::from_str(&content).map_err(|e| StoreError::Config {
            cause: format!("failed to parse config file: {}", e),
        })
    }

    /// Write the default configuration into the data directory.
    pub fn write_default(data_dir: &Path) -> Result<()> {
        Self::default().write(data_dir)
    }

    pub fn write(&self, data_dir: &Path) -> Result<()> {
        let to_config_err = |e: std::io::Error| StoreError::Config {
            cause: e.to_string(),
        };
        std::fs::create_dir_all(data_dir).map_err(to_config_err)?;

        let content = toml::to_string_pretty(self).map_err(|e| StoreError::Config {
            cause: format!("failed to serialize config: {}", e),
        })?;
        std::fs::write(data_dir.join(CONFIG_FILE), content).map_err(to_config_err)?;
        Ok(())
    }

    /// Absolute location of the task document.
    pub fn data_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.data_file)
    }

    /// Absolute location of the image directory.
    pub fn image_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.image_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = TodoConfig::default();
        assert_eq!(config.data_file, "todos.json");
        assert_eq!(config.image_dir, "images");
        assert!(config.delete_replaced_image);
        assert!(!config.permissions.camera);
        assert!(config.permissions.photo_library);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = TodoConfig::load_or_default(temp.path()).unwrap();
        assert_eq!(config, TodoConfig::default());
    }

    #[test]
    fn test_write_then_load() {
        let temp = TempDir::new().unwrap();
        let mut config = TodoConfig::default();
        config.delete_replaced_image = false;
        config.permissions.camera = true;
        config.write(temp.path()).unwrap();

        let loaded = TodoConfig::load_or_default(temp.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_write_default_creates_data_dir() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join(".todo");

        TodoConfig::write_default(&data_dir).unwrap();

        assert!(data_dir.join(CONFIG_FILE).is_file());
        let loaded = TodoConfig::load_or_default(&data_dir).unwrap();
        assert_eq!(loaded, TodoConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            "delete_replaced_image = false\n",
        )
        .unwrap();

        let config = TodoConfig::load_or_default(temp.path()).unwrap();
        assert!(!config.delete_replaced_image);
        assert_eq!(config.data_file, "todos.json");
        assert!(config.permissions.photo_library);
    }

    #[test]
    fn test_malformed_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE), "data_file = [").unwrap();

        let err = TodoConfig::load_or_default(temp.path()).unwrap_err();
        assert!(matches!(err, StoreError::Config { .. }));
    }

    #[test]
    fn test_paths_join_data_dir() {
        let config = TodoConfig::default();
        let root = Path::new("/data/.todo");
        assert_eq!(config.data_path(root), root.join("todos.json"));
        assert_eq!(config.image_path(root), root.join("images"));
    }
}
