//! Throwaway renderer profile directory.
//!
//! Each capture runs the renderer with its own `--user-data-dir` so two
//! exports never share a browser instance, cache or lock file.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Prefix of temporary profile directories.
const TEMP_PREFIX: &str = "headless-pdf-";

// ============================================================================
// RendererProfile
// ============================================================================

/// A renderer user-data directory.
///
/// Temporary profiles from [`RendererProfile::new_temp`] are deleted when
/// dropped. Profiles from [`RendererProfile::from_path`] are left in place.
pub struct RendererProfile {
    /// Keeps the temporary directory alive.
    _temp_dir: Option<TempDir>,
    /// Path passed to the renderer.
    path: PathBuf,
}

impl fmt::Debug for RendererProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererProfile")
            .field("path", &self.path)
            .field("temporary", &self._temp_dir.is_some())
            .finish()
    }
}

impl RendererProfile {
    /// Creates a fresh profile in the system temp directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the directory cannot be created.
    pub fn new_temp() -> Result<Self> {
        let temp_dir = TempDir::with_prefix(TEMP_PREFIX)?;
        let path = temp_dir.path().to_path_buf();
        debug!(path = %path.display(), "Created temporary profile");

        Ok(Self {
            _temp_dir: Some(temp_dir),
            path,
        })
    }

    /// Uses an existing directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the directory cannot be created.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            debug!(path = %path.display(), "Using existing profile directory");
        } else {
            fs::create_dir_all(&path).map_err(|e| {
                Error::config(format!(
                    "Failed to create profile directory at {}: {e}",
                    path.display()
                ))
            })?;
            debug!(path = %path.display(), "Created profile directory");
        }

        Ok(Self {
            _temp_dir: None,
            path,
        })
    }

    /// Returns the profile directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the `--user-data-dir` argument for this profile.
    #[must_use]
    pub fn user_data_dir_arg(&self) -> String {
        format!("--user-data-dir={}", self.path.display())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_profile_is_removed_on_drop() {
        let profile = RendererProfile::new_temp().expect("profile");
        let path = profile.path().to_path_buf();
        assert!(path.is_dir());
        assert!(
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(TEMP_PREFIX))
        );
        assert_eq!(
            profile.user_data_dir_arg(),
            format!("--user-data-dir={}", path.display())
        );

        drop(profile);
        assert!(!path.exists());
    }

    #[test]
    fn test_from_path_creates_and_keeps_directory() {
        let parent = TempDir::new().expect("parent");
        let path = parent.path().join("nested").join("profile");

        let profile = RendererProfile::from_path(&path).expect("profile");
        assert!(path.is_dir());
        drop(profile);
        assert!(path.is_dir());
    }
}
