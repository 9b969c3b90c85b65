//! Fatal errors for an organization run.
//!
//! Anything in here aborts the run. Problems with the rules file are not
//! fatal and live in [`crate::config::ConfigError`] instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an organization run.
#[derive(Error, Debug)]
pub enum TidyError {
    /// The explicitly given input file does not exist.
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// No input was given and no Chrome bookmarks file could be found.
    #[error("Could not auto-detect a Chrome bookmarks file; pass one with --input")]
    NoDefaultInput,

    /// The input file exists but could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input is not a valid bookmark document.
    #[error("Invalid bookmark document: {reason}")]
    InputParse { reason: String },

    /// The root selected for reorganization is missing from the document.
    #[error("Bookmark document has no '{root}' root")]
    MissingRoot { root: String },

    /// The backup copy could not be created.
    #[error("Failed to create backup '{}': {source}", path.display())]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The reorganized document could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The text report could not be written.
    #[error("Failed to write report '{}': {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document could not be serialized back to JSON.
    #[error("Failed to serialize bookmarks: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for organization runs.
pub type TidyResult<T> = Result<T, TidyError>;
