// Path: crates/archive/src/config.rs

//! Configuration for opening and indexing a container.

use crate::error::{GgpkError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the archive bytes are accessed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IoMode {
    /// Buffered reads through a file handle.
    #[default]
    Buffered,
    /// A read-only memory map of the whole archive.
    Mmap,
}

/// Options controlling how a [`Container`](crate::Container) reads and indexes an archive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
    /// Access strategy for the underlying bytes.
    #[serde(default)]
    pub io_mode: IoMode,
    /// Hold a shared advisory lock on the archive while it is open.
    #[serde(default = "default_lock_file")]
    pub lock_file: bool,
    /// Read buffer size for [`IoMode::Buffered`].
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Check each directory entry's stored hash against the child's name.
    #[serde(default)]
    pub verify_entry_hashes: bool,
    /// Check a file's SHA-256 digest whenever its content is fetched.
    #[serde(default)]
    pub verify_content_hashes: bool,
    /// Stop the eager tree build at this depth below the root.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

fn default_lock_file() -> bool {
    true
}

fn default_buffer_capacity() -> usize {
    64 * 1024
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            io_mode: IoMode::default(),
            lock_file: default_lock_file(),
            buffer_capacity: default_buffer_capacity(),
            verify_entry_hashes: false,
            verify_content_hashes: false,
            max_depth: None,
        }
    }
}

impl ContainerConfig {
    /// Parses a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GgpkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| GgpkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(GgpkError::Config("buffer_capacity must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ContainerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ContainerConfig::default());
        assert!(config.lock_file);
        assert_eq!(config.io_mode, IoMode::Buffered);
    }

    #[test]
    fn parses_all_fields() {
        let config = ContainerConfig::from_toml_str(
            r#"
            io_mode = "mmap"
            lock_file = false
            buffer_capacity = 4096
            verify_entry_hashes = true
            verify_content_hashes = true
            max_depth = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.io_mode, IoMode::Mmap);
        assert!(!config.lock_file);
        assert_eq!(config.buffer_capacity, 4096);
        assert!(config.verify_entry_hashes);
        assert!(config.verify_content_hashes);
        assert_eq!(config.max_depth, Some(2));
    }

    #[test]
    fn rejects_unknown_keys_and_zero_buffer() {
        assert!(matches!(
            ContainerConfig::from_toml_str("compress = true"),
            Err(GgpkError::Config(_))
        ));
        assert!(matches!(
            ContainerConfig::from_toml_str("buffer_capacity = 0"),
            Err(GgpkError::Config(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ContainerConfig::load(Path::new("/nonexistent/ggpk.toml")).unwrap_err();
        assert!(matches!(err, GgpkError::Config(msg) if msg.contains("ggpk.toml")));
    }
}
