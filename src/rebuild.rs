//! Rebuilding the bookmark tree from classified entries.
//!
//! Classified bookmarks are grouped into one synthetic folder per non-empty
//! category, listed in lexicographic order. Sensitive bookmarks never get a
//! top-level folder: they are nested as a `Sensitive` sub-folder inside
//! `Uncategorized`.
//!
//! Synthetic folders need the fields Chrome expects on every folder. Chrome
//! stores times as microseconds since 1601-01-01 (the Windows epoch), so
//! timestamps are Unix microseconds shifted by [`Timebase::epoch_offset_micros`].

use crate::bookmark::{BookmarkEntry, BookmarkNode, Document, FolderNode, Metadata};
use crate::classifier::{Classification, SENSITIVE, UNCATEGORIZED};
use crate::config::RuleSet;
use crate::error::{TidyError, TidyResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Microseconds from 1601-01-01T00:00:00Z to 1970-01-01T00:00:00Z.
pub const WINDOWS_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

/// Time base of the consuming application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timebase {
    /// Added to Unix microseconds to get the application's timestamp.
    pub epoch_offset_micros: i64,
}

impl Default for Timebase {
    fn default() -> Self {
        Self {
            epoch_offset_micros: WINDOWS_EPOCH_OFFSET_MICROS,
        }
    }
}

/// Converts a wall-clock instant into the application's timestamp string.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use marktidy::rebuild::{synthesize_timestamp, Timebase};
///
/// let epoch = DateTime::from_timestamp(0, 0).unwrap();
/// assert_eq!(synthesize_timestamp(epoch, Timebase::default()), "11644473600000000");
/// ```
pub fn synthesize_timestamp(now: DateTime<Utc>, timebase: Timebase) -> String {
    (now.timestamp_micros() + timebase.epoch_offset_micros).to_string()
}

/// Derives a folder GUID from its name and the Unix time in seconds.
///
/// `"Social Media"` created at `1700000000` becomes `"social-media-1700000000"`.
pub fn synthesize_guid(name: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", name.to_lowercase().replace(' ', "-"), now.timestamp())
}

/// Creates synthetic folders with fresh metadata.
///
/// All folders made by one factory share the same timestamp. Ids are handed
/// out sequentially so they never collide with each other or with ids already
/// in the document, as long as no more folders are created than the factory
/// was sized for.
#[derive(Debug, Clone)]
pub struct FolderFactory {
    now: DateTime<Utc>,
    timebase: Timebase,
    next_id: u64,
}

impl FolderFactory {
    /// Creates a factory whose first folder gets id `first_id`.
    pub fn new(now: DateTime<Utc>, timebase: Timebase, first_id: u64) -> Self {
        Self {
            now,
            timebase,
            next_id: first_id,
        }
    }

    /// Creates a factory handing out up to `capacity` ids above every id in
    /// `document`.
    ///
    /// # Errors
    ///
    /// Returns `TidyError::InputParse` if the document's ids leave no room for
    /// `capacity` more below `u64::MAX`.
    pub fn for_document(
        document: &Document,
        now: DateTime<Utc>,
        timebase: Timebase,
        capacity: u64,
    ) -> TidyResult<Self> {
        let max_id = document.max_id();
        max_id
            .checked_add(capacity)
            .map(|_| Self::new(now, timebase, max_id + 1))
            .ok_or_else(|| TidyError::InputParse {
                reason: format!(
                    "bookmark id {} leaves no room for {} new folders",
                    max_id, capacity
                ),
            })
    }

    /// The current time as an application timestamp.
    pub fn timestamp(&self) -> String {
        synthesize_timestamp(self.now, self.timebase)
    }

    /// Creates a folder named `name` holding `children`.
    pub fn create_folder(&mut self, name: &str, children: Vec<BookmarkNode>) -> FolderNode {
        let timestamp = self.timestamp();
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);

        let mut meta = Metadata::new();
        meta.insert("date_added".into(), Value::from(timestamp.clone()));
        meta.insert("date_last_used".into(), Value::from("0"));
        meta.insert("date_modified".into(), Value::from(timestamp));
        meta.insert("guid".into(), Value::from(synthesize_guid(name, self.now)));
        meta.insert("id".into(), Value::from(id.to_string()));

        FolderNode {
            name: Some(name.to_string()),
            children: Some(children),
            meta,
        }
    }
}

/// Unique bookmarks grouped by classification outcome.
#[derive(Debug, Default)]
pub struct ClassifiedBookmarks {
    categories: HashMap<String, Vec<BookmarkEntry>>,
    sensitive: Vec<BookmarkEntry>,
    uncategorized: Vec<BookmarkEntry>,
}

impl ClassifiedBookmarks {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `entry` under its classification, preserving arrival order.
    pub fn push(&mut self, classification: Classification<'_>, entry: BookmarkEntry) {
        match classification {
            Classification::Sensitive => self.sensitive.push(entry),
            Classification::Rule { category, .. } => self
                .categories
                .entry(category.to_string())
                .or_default()
                .push(entry),
            Classification::Unmatched => self.uncategorized.push(entry),
        }
    }

    /// Bookmarks assigned to a rule category.
    pub fn category(&self, name: &str) -> &[BookmarkEntry] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bookmarks caught by the sensitive-content check.
    pub fn sensitive(&self) -> &[BookmarkEntry] {
        &self.sensitive
    }

    /// Bookmarks no rule matched.
    pub fn uncategorized(&self) -> &[BookmarkEntry] {
        &self.uncategorized
    }

    /// Non-empty rule categories with their sizes, sorted by name.
    pub fn category_counts(&self, rules: &RuleSet) -> Vec<(String, usize)> {
        rules
            .sorted_names()
            .into_iter()
            .map(|name| (name.to_string(), self.category(name).len()))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Total number of bookmarks in the table.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum::<usize>()
            + self.sensitive.len()
            + self.uncategorized.len()
    }

    /// Returns true if no bookmark has been filed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the new children of the reorganized root.
///
/// One folder per non-empty category in `rules`, sorted by name. Then, if
/// there are sensitive bookmarks, an `Uncategorized` folder holding the
/// unmatched bookmarks followed by a `Sensitive` sub-folder; otherwise a plain
/// `Uncategorized` folder when any bookmark went unmatched.
pub fn rebuild(
    mut classified: ClassifiedBookmarks,
    rules: &RuleSet,
    factory: &mut FolderFactory,
) -> Vec<BookmarkNode> {
    let mut folders = Vec::new();

    for name in rules.sorted_names() {
        if let Some(entries) = classified.categories.remove(name)
            && !entries.is_empty()
        {
            let folder = factory.create_folder(name, into_nodes(entries));
            folders.push(BookmarkNode::Folder(folder));
        }
    }

    if !classified.sensitive.is_empty() {
        let sensitive = factory.create_folder(SENSITIVE, into_nodes(classified.sensitive));
        let mut children = into_nodes(classified.uncategorized);
        children.push(BookmarkNode::Folder(sensitive));
        folders.push(BookmarkNode::Folder(
            factory.create_folder(UNCATEGORIZED, children),
        ));
    } else if !classified.uncategorized.is_empty() {
        let folder = factory.create_folder(UNCATEGORIZED, into_nodes(classified.uncategorized));
        folders.push(BookmarkNode::Folder(folder));
    }

    folders
}

fn into_nodes(entries: Vec<BookmarkEntry>) -> Vec<BookmarkNode> {
    entries.into_iter().map(BookmarkNode::Url).collect()
}
