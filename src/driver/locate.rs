//! Renderer auto-detection.

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::ffi::OsStr;
use std::path::PathBuf;

use tracing::debug;

// ============================================================================
// Known Locations
// ============================================================================

/// Absolute install locations checked first.
#[cfg(target_os = "macos")]
const KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
    "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
];

/// Absolute install locations checked first.
#[cfg(target_os = "windows")]
const KNOWN_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
];

/// Absolute install locations checked first.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const KNOWN_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/usr/bin/brave-browser",
    "/usr/bin/microsoft-edge",
];

/// Executable names looked up on `PATH` afterwards.
const PATH_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "brave-browser",
    "microsoft-edge",
    "chrome",
];

// ============================================================================
// Public API
// ============================================================================

/// Returns the first Chrome-family renderer found on this machine.
///
/// Only executable files count; on Windows `PATHEXT` suffixes apply.
#[must_use]
pub fn find_renderer() -> Option<PathBuf> {
    let path_var = env::var_os("PATH");
    let found = find_in(KNOWN_PATHS, path_var.as_deref());

    match &found {
        Some(path) => debug!(path = %path.display(), "Renderer found"),
        None => debug!("No renderer found"),
    }
    found
}

/// Checks `known` absolute paths, then resolves [`PATH_NAMES`] against
/// `path_var`.
fn find_in(known: &[&str], path_var: Option<&OsStr>) -> Option<PathBuf> {
    known
        .iter()
        .find_map(|path| which::which(path).ok())
        .or_else(|| {
            PATH_NAMES
                .iter()
                .find_map(|name| which::which_in(name, path_var, ".").ok())
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::ffi::OsString;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use tempfile::TempDir;

    fn touch(path: &Path, mode: u32) {
        fs::write(path, b"#!/bin/sh\n").expect("write");
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("chmod");
    }

    fn search_path(dirs: &[&Path]) -> OsString {
        env::join_paths(dirs).expect("join paths")
    }

    #[test]
    fn test_known_path_wins() {
        let dir = TempDir::new().expect("dir");
        let known = dir.path().join("Chrome");
        touch(&known, 0o755);
        touch(&dir.path().join("chromium"), 0o755);

        let known_str = known.to_str().expect("utf-8");
        let path_var = search_path(&[dir.path()]);
        let found = find_in(&[known_str], Some(&path_var));
        assert_eq!(found, Some(known));
    }

    #[test]
    fn test_falls_back_to_path_dirs() {
        let empty = TempDir::new().expect("dir");
        let bin = TempDir::new().expect("dir");
        touch(&bin.path().join("chromium"), 0o755);

        let path_var = search_path(&[empty.path(), bin.path()]);
        let found = find_in(&["/nonexistent/chrome"], Some(&path_var));
        assert_eq!(found, Some(bin.path().join("chromium")));
    }

    #[test]
    fn test_non_executable_files_are_skipped() {
        let dir = TempDir::new().expect("dir");
        let known = dir.path().join("Chrome");
        touch(&known, 0o644);
        touch(&dir.path().join("chromium"), 0o644);

        let known_str = known.to_str().expect("utf-8");
        let path_var = search_path(&[dir.path()]);
        assert!(find_in(&[known_str], Some(&path_var)).is_none());

        touch(&dir.path().join("chrome"), 0o755);
        assert_eq!(
            find_in(&[known_str], Some(&path_var)),
            Some(dir.path().join("chrome"))
        );
    }

    #[test]
    fn test_nothing_found() {
        let empty = TempDir::new().expect("dir");
        let path_var = search_path(&[empty.path()]);
        assert!(find_in(&[], Some(&path_var)).is_none());
        assert!(find_in(&[], None).is_none());
    }
}
