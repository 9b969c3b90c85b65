//! The bookmark reorganization pipeline.
//!
//! One run takes a parsed [`Document`] through four stages:
//!
//! 1. [`flatten`] the target root, dropping its folder structure
//! 2. [`deduplicate`] by URL, keeping the first occurrence
//! 3. classify each unique bookmark with a [`Classifier`]
//! 4. [`rebuild`] one folder per category under the same root
//!
//! Every other root is passed through untouched. The whole pipeline is pure:
//! it never touches the filesystem.

use crate::bookmark::{BookmarkEntry, BookmarkNode, Document, FolderNode};
use crate::classifier::{Classification, Classifier};
use crate::error::{TidyError, TidyResult};
use crate::rebuild::{ClassifiedBookmarks, FolderFactory, Timebase, rebuild};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;

/// Root reorganized when no other is requested ("Other bookmarks").
pub const DEFAULT_TARGET_ROOT: &str = "other";

/// Root Chrome keeps mobile bookmarks in.
const SYNCED_ROOT: &str = "synced";

/// Name used in paths for folders that have none.
const UNKNOWN_FOLDER: &str = "Unknown";

/// A bookmark lifted out of the tree, with the folder path it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBookmark {
    /// The bookmark itself, metadata included.
    pub entry: BookmarkEntry,
    /// Slash-joined names of the folders it was nested in. Diagnostic only.
    pub original_path: String,
}

/// Collects every bookmark below `folder`, depth-first in document order.
///
/// Folders without a `children` field contribute nothing. The root folder's
/// own name is not part of the paths.
pub fn flatten(folder: FolderNode) -> Vec<FlatBookmark> {
    let mut bookmarks = Vec::new();
    flatten_into(folder.children.unwrap_or_default(), "", &mut bookmarks);
    bookmarks
}

fn flatten_into(children: Vec<BookmarkNode>, path: &str, out: &mut Vec<FlatBookmark>) {
    for child in children {
        match child {
            BookmarkNode::Url(entry) => out.push(FlatBookmark {
                entry,
                original_path: path.to_string(),
            }),
            BookmarkNode::Folder(folder) => {
                let name = folder.name.as_deref().unwrap_or(UNKNOWN_FOLDER);
                let sub_path = if path.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{}", path, name)
                };
                flatten_into(folder.children.unwrap_or_default(), &sub_path, out);
            }
        }
    }
}

/// Result of [`deduplicate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    /// First occurrence of every URL, plus every bookmark without a URL.
    pub unique: Vec<FlatBookmark>,
    /// Later occurrences of URLs already in `unique`.
    pub duplicates: Vec<FlatBookmark>,
}

/// Splits bookmarks into first occurrences and duplicates, preserving order.
///
/// URLs are compared as exact strings. Bookmarks with an empty or missing URL
/// are never duplicates of anything.
pub fn deduplicate(bookmarks: Vec<FlatBookmark>) -> Deduplicated {
    let mut seen = HashSet::new();
    let mut result = Deduplicated::default();

    for bookmark in bookmarks {
        let url = bookmark.entry.url();
        if url.is_empty() || seen.insert(url.to_string()) {
            result.unique.push(bookmark);
        } else {
            result.duplicates.push(bookmark);
        }
    }

    result
}

/// Settings for one [`organize`] run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Name of the root to reorganize.
    pub target_root: String,
    /// Time base for synthetic timestamps.
    pub timebase: Timebase,
    /// Creation time stamped on synthetic folders.
    pub now: DateTime<Utc>,
}

impl Default for OrganizeOptions {
    fn default() -> Self {
        Self {
            target_root: DEFAULT_TARGET_ROOT.to_string(),
            timebase: Timebase::default(),
            now: Utc::now(),
        }
    }
}

/// Where one unique bookmark ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Bookmark name.
    pub name: String,
    /// Bookmark URL.
    pub url: String,
    /// Folder path the bookmark was found in.
    pub original_path: String,
    /// Category folder it was assigned to.
    pub category: String,
    /// Keyword that selected the category, for rule matches.
    pub keyword: Option<String>,
}

/// Counts and details of one run, for display and the text report.
#[derive(Debug, Clone, Default)]
pub struct OrganizeReport {
    /// Bookmarks found in the target root.
    pub total: usize,
    /// Bookmarks dropped as duplicates.
    pub duplicates: Vec<FlatBookmark>,
    /// Bookmarks kept.
    pub unique: usize,
    /// Non-empty rule categories and their sizes, sorted by name.
    pub category_counts: Vec<(String, usize)>,
    /// Bookmarks caught by the sensitive-content check.
    pub sensitive: usize,
    /// Bookmarks no rule matched.
    pub uncategorized: usize,
    /// Per-bookmark outcome, in input order.
    pub assignments: Vec<Assignment>,
}

impl OrganizeReport {
    /// Bookmarks assigned to a rule category.
    pub fn categorized(&self) -> usize {
        self.category_counts.iter().map(|(_, count)| count).sum()
    }

    /// Share of unique bookmarks assigned to a rule category, in percent.
    pub fn classification_rate(&self) -> f64 {
        if self.unique == 0 {
            0.0
        } else {
            self.categorized() as f64 / self.unique as f64 * 100.0
        }
    }
}

/// A reorganized document and what happened to produce it.
#[derive(Debug, Clone)]
pub struct Organized {
    /// The restructured document.
    pub document: Document,
    /// Run statistics.
    pub report: OrganizeReport,
}

/// Runs the full pipeline on `document`.
///
/// The target root keeps its own name and metadata but gets its children
/// replaced by the category folders, a refreshed `date_modified` and
/// `date_last_used` reset to `"0"`. A missing `synced` root is added empty.
///
/// # Errors
///
/// Returns `TidyError::MissingRoot` if the document has no root named
/// `options.target_root`, and `TidyError::InputParse` if its ids leave no room
/// for the new folders.
///
/// # Examples
///
/// ```
/// use marktidy::bookmark::Document;
/// use marktidy::classifier::Classifier;
/// use marktidy::config::RuleSet;
/// use marktidy::organizer::{organize, OrganizeOptions};
///
/// let doc = Document::from_json(r#"{"roots": {"other": {"type": "folder", "name": "Other",
///     "children": [{"type": "url", "name": "Repo", "url": "https://github.com/x"}]}}}"#).unwrap();
/// let organized = organize(doc, &Classifier::new(RuleSet::default()), &OrganizeOptions::default()).unwrap();
/// assert_eq!(organized.report.category_counts, vec![("Technology".to_string(), 1)]);
/// ```
pub fn organize(
    mut document: Document,
    classifier: &Classifier,
    options: &OrganizeOptions,
) -> TidyResult<Organized> {
    // One folder per category, plus Uncategorized, Sensitive and `synced`.
    let capacity = classifier.rules().len() as u64 + 3;
    let mut factory =
        FolderFactory::for_document(&document, options.now, options.timebase, capacity)?;

    let FolderNode {
        name,
        children,
        mut meta,
    } = document
        .roots
        .remove(&options.target_root)
        .ok_or_else(|| TidyError::MissingRoot {
            root: options.target_root.clone(),
        })?;

    let flat = flatten(FolderNode {
        children,
        ..FolderNode::default()
    });
    let total = flat.len();
    let Deduplicated { unique, duplicates } = deduplicate(flat);

    let mut report = OrganizeReport {
        total,
        unique: unique.len(),
        ..OrganizeReport::default()
    };
    let mut classified = ClassifiedBookmarks::new();

    for FlatBookmark {
        entry,
        original_path,
    } in unique
    {
        let classification = classifier.classify_entry(&entry);
        report.assignments.push(Assignment {
            name: entry.name().to_string(),
            url: entry.url().to_string(),
            original_path,
            category: classification.category_name().to_string(),
            keyword: match classification {
                Classification::Rule { keyword, .. } => Some(keyword.to_string()),
                _ => None,
            },
        });
        classified.push(classification, entry);
    }

    report.duplicates = duplicates;
    report.category_counts = classified.category_counts(classifier.rules());
    report.sensitive = classified.sensitive().len();
    report.uncategorized = classified.uncategorized().len();

    let folders = rebuild(classified, classifier.rules(), &mut factory);

    meta.insert("date_last_used".into(), Value::from("0"));
    meta.insert("date_modified".into(), Value::from(factory.timestamp()));
    document.roots.insert(
        options.target_root.clone(),
        FolderNode {
            name,
            children: Some(folders),
            meta,
        },
    );

    if !document.roots.contains_key(SYNCED_ROOT) {
        let synced = factory.create_folder("Mobile Bookmarks", Vec::new());
        document.roots.insert(SYNCED_ROOT.to_string(), synced);
    }

    Ok(Organized { document, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;

    fn url(name: &str, url: &str) -> BookmarkNode {
        BookmarkNode::Url(BookmarkEntry::new(name, url))
    }

    fn flat(url: &str) -> FlatBookmark {
        FlatBookmark {
            entry: BookmarkEntry::new(url, url),
            original_path: String::new(),
        }
    }

    fn urls(bookmarks: &[FlatBookmark]) -> Vec<&str> {
        bookmarks.iter().map(|b| b.entry.url()).collect()
    }

    fn fixed_options() -> OrganizeOptions {
        OrganizeOptions {
            now: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            ..OrganizeOptions::default()
        }
    }

    #[test]
    fn test_flatten_depth_first_with_paths() {
        let tree = FolderNode::new(
            "Other",
            vec![
                url("a", "http://a"),
                BookmarkNode::Folder(FolderNode::new(
                    "Dev",
                    vec![
                        BookmarkNode::Folder(FolderNode::new("Rust", vec![url("b", "http://b")])),
                        url("c", "http://c"),
                    ],
                )),
                url("d", "http://d"),
            ],
        );

        let bookmarks = flatten(tree);
        assert_eq!(
            urls(&bookmarks),
            vec!["http://a", "http://b", "http://c", "http://d"]
        );
        let paths: Vec<_> = bookmarks.iter().map(|b| b.original_path.as_str()).collect();
        assert_eq!(paths, vec!["", "Dev/Rust", "Dev", ""]);
    }

    #[test]
    fn test_flatten_count_matches_url_nodes() {
        let tree = FolderNode::new(
            "Other",
            vec![
                BookmarkNode::Folder(FolderNode::new("Empty", vec![])),
                BookmarkNode::Folder(FolderNode::new(
                    "Nested",
                    vec![
                        url("x", "http://x"),
                        url("x again", "http://x"),
                        BookmarkNode::Folder(FolderNode::new("Deep", vec![url("y", "")])),
                    ],
                )),
            ],
        );

        let expected = tree.count_bookmarks();
        assert_eq!(flatten(tree).len(), expected);
        assert_eq!(expected, 3);
    }

    #[test]
    fn test_flatten_folder_without_children() {
        let childless = FolderNode {
            name: Some("Broken".to_string()),
            children: None,
            meta: Default::default(),
        };
        let tree = FolderNode::new(
            "Other",
            vec![BookmarkNode::Folder(childless), url("a", "http://a")],
        );
        assert_eq!(urls(&flatten(tree)), vec!["http://a"]);
    }

    #[test]
    fn test_flatten_unnamed_folder_is_unknown() {
        let unnamed = FolderNode {
            name: None,
            children: Some(vec![url("a", "http://a")]),
            meta: Default::default(),
        };
        let tree = FolderNode::new("Other", vec![BookmarkNode::Folder(unnamed)]);
        assert_eq!(flatten(tree)[0].original_path, "Unknown");
    }

    #[test]
    fn test_deduplicate_first_occurrence_wins() {
        let result = deduplicate(vec![flat("x"), flat("y"), flat("x")]);
        assert_eq!(urls(&result.unique), vec!["x", "y"]);
        assert_eq!(urls(&result.duplicates), vec!["x"]);
    }

    #[test]
    fn test_deduplicate_keeps_the_first_entry_object() {
        let mut first = flat("http://x");
        first.entry.name = Some("first".to_string());
        let mut second = flat("http://x");
        second.entry.name = Some("second".to_string());

        let result = deduplicate(vec![first, second]);
        assert_eq!(result.unique[0].entry.name(), "first");
        assert_eq!(result.duplicates[0].entry.name(), "second");
    }

    #[test]
    fn test_deduplicate_empty_urls_always_kept() {
        let result = deduplicate(vec![flat(""), flat(""), flat("a"), flat("")]);
        assert_eq!(result.unique.len(), 4);
        assert!(result.duplicates.is_empty());
    }

    #[test]
    fn test_deduplicate_no_normalization() {
        let result = deduplicate(vec![
            flat("http://x.com"),
            flat("http://x.com/"),
            flat("https://x.com"),
            flat("HTTP://X.COM"),
        ]);
        assert_eq!(result.unique.len(), 4);
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let first = deduplicate(vec![flat("a"), flat("b"), flat("a"), flat(""), flat("b")]);
        let second = deduplicate(first.unique.clone());
        assert_eq!(second.unique, first.unique);
        assert!(second.duplicates.is_empty());
    }

    #[test]
    fn test_organize_missing_root() {
        let doc = Document::from_json(r#"{"roots": {"bookmark_bar": {"type": "folder", "name": "Bar", "children": []}}}"#)
            .unwrap();
        let result = organize(doc, &Classifier::new(RuleSet::default()), &fixed_options());
        assert!(matches!(result, Err(TidyError::MissingRoot { root }) if root == "other"));
    }

    #[test]
    fn test_organize_rejects_exhausted_ids() {
        let doc = Document::from_json(&format!(
            r#"{{"roots": {{"other": {{"type": "folder", "name": "o", "id": "{}", "children": [
                {{"type": "url", "name": "n", "url": "https://bbc.co.uk"}}
            ]}}}}}}"#,
            u64::MAX
        ))
        .unwrap();
        let result = organize(doc, &Classifier::new(RuleSet::default()), &fixed_options());
        assert!(matches!(result, Err(TidyError::InputParse { .. })));
    }

    #[test]
    fn test_organize_keeps_root_metadata() {
        let doc = Document::from_json(
            r#"{"roots": {"other": {"type": "folder", "name": "Other bookmarks", "id": "2",
                "guid": "other-guid", "date_added": "42", "date_modified": "43",
                "children": [{"type": "url", "name": "n", "url": "https://bbc.co.uk", "id": "5"}]}}}"#,
        )
        .unwrap();
        let organized =
            organize(doc, &Classifier::new(RuleSet::default()), &fixed_options()).unwrap();

        let other = &organized.document.roots["other"];
        assert_eq!(other.name(), "Other bookmarks");
        assert_eq!(other.meta["id"], Value::from("2"));
        assert_eq!(other.meta["guid"], Value::from("other-guid"));
        assert_eq!(other.meta["date_added"], Value::from("42"));
        assert_ne!(other.meta["date_modified"], Value::from("43"));
        assert_eq!(other.meta["date_last_used"], Value::from("0"));

        let news = match &other.children()[0] {
            BookmarkNode::Folder(folder) => folder,
            BookmarkNode::Url(_) => panic!("expected a folder"),
        };
        assert_eq!(news.name(), "News");
        // Synthetic ids start above the largest id in the document.
        assert_eq!(news.meta["id"], Value::from("6"));
        match &news.children()[0] {
            BookmarkNode::Url(entry) => assert_eq!(entry.meta["id"], Value::from("5")),
            BookmarkNode::Folder(_) => panic!("expected a bookmark"),
        }
    }

    #[test]
    fn test_organize_adds_missing_synced_root() {
        let doc = Document::from_json(r#"{"roots": {"other": {"type": "folder", "name": "o", "children": []}}}"#)
            .unwrap();
        let organized =
            organize(doc, &Classifier::new(RuleSet::default()), &fixed_options()).unwrap();
        let synced = &organized.document.roots["synced"];
        assert_eq!(synced.name(), "Mobile Bookmarks");
        assert!(synced.children().is_empty());
    }

    #[test]
    fn test_organize_custom_target_root() {
        let doc = Document::from_json(
            r#"{"roots": {
                "bookmark_bar": {"type": "folder", "name": "Bar", "children": [
                    {"type": "folder", "name": "Stuff", "children": [
                        {"type": "url", "name": "Tube", "url": "https://youtube.com"}
                    ]}
                ]},
                "other": {"type": "folder", "name": "o", "children": [
                    {"type": "folder", "name": "Keep", "children": []}
                ]}
            }}"#,
        )
        .unwrap();
        let options = OrganizeOptions {
            target_root: "bookmark_bar".to_string(),
            ..fixed_options()
        };
        let organized = organize(doc.clone(), &Classifier::new(RuleSet::default()), &options).unwrap();

        assert_eq!(organized.document.roots["other"], doc.roots["other"]);
        assert_eq!(
            organized.report.category_counts,
            vec![("Entertainment".to_string(), 1)]
        );
    }

    #[test]
    fn test_report_classification_rate() {
        let report = OrganizeReport {
            unique: 4,
            category_counts: vec![("A".to_string(), 1), ("B".to_string(), 2)],
            ..OrganizeReport::default()
        };
        assert_eq!(report.categorized(), 3);
        assert!((report.classification_rate() - 75.0).abs() < f64::EPSILON);
        assert_eq!(OrganizeReport::default().classification_rate(), 0.0);
    }

    #[test]
    fn test_assignments_record_keyword() {
        let doc = Document::from_json(
            r#"{"roots": {"other": {"type": "folder", "name": "o", "children": [
                {"type": "folder", "name": "Dev", "children": [
                    {"type": "url", "name": "Repo", "url": "https://github.com/x"}
                ]},
                {"type": "url", "name": "Home", "url": "https://example.org"}
            ]}}}"#,
        )
        .unwrap();
        let organized =
            organize(doc, &Classifier::new(RuleSet::default()), &fixed_options()).unwrap();
        let assignments = &organized.report.assignments;

        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].category, "Technology");
        assert_eq!(assignments[0].keyword.as_deref(), Some("github"));
        assert_eq!(assignments[0].original_path, "Dev");
        assert_eq!(assignments[1].category, "Uncategorized");
        assert_eq!(assignments[1].keyword, None);
    }
}
