//! Locating the Chrome bookmarks file and backing it up before a run.

use crate::error::{TidyError, TidyResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Chrome profile locations relative to the home directory, probed in order.
const CHROME_BOOKMARK_PATHS: &[&str] = &[
    // macOS
    "Library/Application Support/Google/Chrome/Default/Bookmarks",
    // Linux
    ".config/google-chrome/Default/Bookmarks",
];

/// Checked last, and only on Windows.
const WINDOWS_BOOKMARK_PATH: &str = "AppData/Local/Google/Chrome/User Data/Default/Bookmarks";

/// Candidate bookmark file paths under `home`, in probe order.
pub fn candidate_paths(home: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = CHROME_BOOKMARK_PATHS
        .iter()
        .map(|relative| home.join(relative))
        .collect();
    if cfg!(windows) {
        paths.push(home.join(WINDOWS_BOOKMARK_PATH));
    }
    paths
}

/// Finds the default Chrome profile's bookmarks file, if one exists.
pub fn detect_bookmarks_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    candidate_paths(&home).into_iter().find(|path| path.exists())
}

/// Resolves the input file: the explicit path if given, otherwise the
/// auto-detected Chrome file.
///
/// # Errors
///
/// Returns `TidyError::InputNotFound` if the explicit path does not exist and
/// `TidyError::NoDefaultInput` if nothing could be detected.
pub fn resolve_input(explicit: Option<&Path>) -> TidyResult<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => detect_bookmarks_path().ok_or(TidyError::NoDefaultInput)?,
    };

    if !path.exists() {
        return Err(TidyError::InputNotFound { path });
    }
    Ok(path)
}

/// Copies `input` to `<backup_dir>/Bookmarks_backup_<stamp>.json`.
///
/// The backup directory is created if needed. Returns the backup path.
///
/// # Errors
///
/// Returns `TidyError::BackupFailed` if the directory cannot be created or the
/// copy fails.
pub fn create_backup(input: &Path, backup_dir: &Path, stamp: &str) -> TidyResult<PathBuf> {
    let backup_path = backup_dir.join(format!("Bookmarks_backup_{}.json", stamp));

    fs::create_dir_all(backup_dir).map_err(|e| TidyError::BackupFailed {
        path: backup_dir.to_path_buf(),
        source: e,
    })?;
    fs::copy(input, &backup_path).map_err(|e| TidyError::BackupFailed {
        path: backup_path.clone(),
        source: e,
    })?;

    Ok(backup_path)
}
