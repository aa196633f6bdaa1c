//! OS directory resolution for config and log files.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while locating or creating app directories.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    #[error("platform I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-user locations for the viewer's files.
///
/// Follows OS conventions through the `dirs` crate: XDG on Linux, Known
/// Folders on Windows, `Library` on macOS.
#[derive(Debug, Clone)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Downloaded assets.
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "terra";

impl PlatformDirs {
    /// Resolve directories without creating them.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS exposes no
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| app_config.join("cache"));

        Ok(Self {
            config_dir: app_config.join("config"),
            cache_dir,
            log_dir: app_config.join("logs"),
        })
    }

    /// Resolve directories and create them on disk.
    pub fn resolve_and_create() -> Result<Self, PlatformError> {
        let dirs = Self::resolve()?;
        dirs.create_dirs()?;
        Ok(dirs)
    }

    /// Directories rooted under `root`, for tests and `--config` overrides.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            cache_dir: app_dir.join("cache"),
            log_dir: app_dir.join("logs"),
        }
    }

    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_layout() {
        let root = Path::new("/tmp/terra-root");
        let dirs = PlatformDirs::resolve_with_root(root);
        assert!(dirs.config_dir.starts_with(root));
        assert!(dirs.config_dir.ends_with("config"));
        assert!(dirs.log_dir.ends_with("logs"));
        assert_ne!(dirs.config_dir, dirs.cache_dir);
    }

    #[test]
    fn test_directory_creation() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().expect("create_dirs failed for temp root");

        assert!(dirs.config_dir.is_dir());
        assert!(dirs.cache_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }

    #[test]
    fn test_create_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        dirs.create_dirs().unwrap();
    }

    #[test]
    fn test_resolved_paths_are_absolute() {
        if let Ok(dirs) = PlatformDirs::resolve() {
            assert!(dirs.config_dir.is_absolute());
            assert!(dirs.log_dir.is_absolute());
        }
    }
}
