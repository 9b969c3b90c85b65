//! marktidy - A Chrome bookmark cleanup utility
//!
//! This library flattens the folder structure of a Chrome bookmark file,
//! removes duplicate URLs, assigns every bookmark to a category by keyword
//! matching and writes back a tree with one folder per category. Roots that
//! are not being reorganized are passed through unchanged.

pub mod backup;
pub mod bookmark;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod organizer;
pub mod output;
pub mod rebuild;
pub mod report;

pub use bookmark::{BookmarkEntry, BookmarkNode, Document, FolderNode};
pub use classifier::{Classification, Classifier};
pub use config::{ConfigError, RuleSet};
pub use error::{TidyError, TidyResult};
pub use organizer::{OrganizeOptions, OrganizeReport, Organized, organize};

pub use cli::{CliArgs, run_cli};
