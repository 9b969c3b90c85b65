//! Chrome bookmark document model.
//!
//! A bookmark file is a JSON document with a handful of named roots, each of
//! them a folder. Nodes are either `url` leaves or `folder` containers, told
//! apart by their `type` tag:
//!
//! ```json
//! {
//!   "checksum": "…",
//!   "roots": {
//!     "bookmark_bar": { "type": "folder", "name": "Bookmarks bar", "children": [] },
//!     "other": { "type": "folder", "name": "Other bookmarks", "children": [] }
//!   },
//!   "version": 1
//! }
//! ```
//!
//! Every field this crate does not interpret (ids, guids, timestamps,
//! `meta_info`, …) is kept in an order-preserving [`Metadata`] map and written
//! back untouched. So is an explicit `null` in `name`, `url` or `children`.

use crate::error::{TidyError, TidyResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Passthrough fields of a node, in document order.
pub type Metadata = Map<String, Value>;

/// A node of the bookmark tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub enum BookmarkNode {
    /// A bookmark (`"type": "url"`).
    Url(BookmarkEntry),
    /// A folder (`"type": "folder"`).
    Folder(FolderNode),
}

/// A single bookmark.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookmarkEntry {
    /// Display name. Absent names are written back absent.
    pub name: Option<String>,
    /// Target URL. May be absent or empty in hand-edited files.
    pub url: Option<String>,
    /// Passthrough fields (`id`, `guid`, `date_added`, …).
    pub meta: Metadata,
}

impl BookmarkEntry {
    /// Creates a bookmark with no metadata.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            meta: Metadata::new(),
        }
    }

    /// The URL, or `""` when absent.
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// The name, or `""` when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// A folder of bookmarks and sub-folders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct FolderNode {
    /// Display name.
    pub name: Option<String>,
    /// Child nodes. `None` when the input folder had no `children` field.
    pub children: Option<Vec<BookmarkNode>>,
    /// Passthrough fields.
    pub meta: Metadata,
}

impl FolderNode {
    /// Creates a folder with the given children and no metadata.
    pub fn new(name: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        Self {
            name: Some(name.into()),
            children: Some(children),
            meta: Metadata::new(),
        }
    }

    /// The name, or `""` when absent.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// The children, empty when the folder has no `children` field.
    pub fn children(&self) -> &[BookmarkNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Counts `url` nodes anywhere below this folder.
    pub fn count_bookmarks(&self) -> usize {
        self.children()
            .iter()
            .map(|child| match child {
                BookmarkNode::Url(_) => 1,
                BookmarkNode::Folder(folder) => folder.count_bookmarks(),
            })
            .sum()
    }

    /// Largest numeric `id` in this folder's subtree, itself included.
    pub fn max_id(&self) -> u64 {
        self.children()
            .iter()
            .map(|child| match child {
                BookmarkNode::Url(entry) => numeric_id(&entry.meta),
                BookmarkNode::Folder(folder) => folder.max_id(),
            })
            .fold(numeric_id(&self.meta), u64::max)
    }
}

/// Chrome writes ids as decimal strings, older exports sometimes as numbers.
fn numeric_id(meta: &Metadata) -> u64 {
    match meta.get("id") {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// Wire shape shared by both node kinds.
///
/// Field order matches the order Chrome itself writes. The outer `Option` of
/// `children`, `name` and `url` is field presence, the inner one is `null`.
#[derive(Serialize, Deserialize)]
struct RawNode {
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    children: Option<Option<Vec<BookmarkNode>>>,
    #[serde(flatten)]
    meta: Metadata,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    name: Option<Option<String>>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    url: Option<Option<String>>,
}

/// Reads a present field, `null` included, as `Some`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Moves an explicit `null` into `meta` so it is written back as it was read.
fn park_null<T>(key: &str, field: Option<Option<T>>, meta: &mut Metadata) -> Option<T> {
    match field {
        Some(Some(value)) => Some(value),
        Some(None) => {
            meta.insert(key.to_string(), Value::Null);
            None
        }
        None => None,
    }
}

/// Inverse of [`park_null`].
fn unpark_null<T>(key: &str, field: Option<T>, meta: &mut Metadata) -> Option<Option<T>> {
    let parked = matches!(meta.get(key), Some(Value::Null));
    if parked {
        meta.shift_remove(key);
    }
    match field {
        Some(value) => Some(Some(value)),
        None if parked => Some(None),
        None => None,
    }
}

impl TryFrom<RawNode> for BookmarkNode {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "url" => {
                let RawNode {
                    children,
                    mut meta,
                    name,
                    url,
                    ..
                } = raw;
                let name = park_null("name", name, &mut meta);
                if let Some(Some(_)) = children {
                    return Err(format!(
                        "url node '{}' must not have children",
                        name.unwrap_or_default()
                    ));
                }
                park_null("children", children, &mut meta);
                let url = park_null("url", url, &mut meta);
                Ok(BookmarkNode::Url(BookmarkEntry { name, url, meta }))
            }
            "folder" => FolderNode::try_from(raw).map(BookmarkNode::Folder),
            other => Err(format!("unknown node type '{}'", other)),
        }
    }
}

impl TryFrom<RawNode> for FolderNode {
    type Error = String;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let RawNode {
            children,
            mut meta,
            name,
            kind,
            url,
        } = raw;
        let name = park_null("name", name, &mut meta);
        let label = name.as_deref().unwrap_or_default();
        if kind != "folder" {
            return Err(format!("expected folder '{}', found type '{}'", label, kind));
        }
        if let Some(Some(_)) = url {
            return Err(format!("folder '{}' must not have a url", label));
        }
        park_null("url", url, &mut meta);
        let children = park_null("children", children, &mut meta);
        Ok(FolderNode {
            name,
            children,
            meta,
        })
    }
}

impl From<BookmarkNode> for RawNode {
    fn from(node: BookmarkNode) -> Self {
        match node {
            BookmarkNode::Url(entry) => {
                let mut meta = entry.meta;
                RawNode {
                    children: unpark_null("children", None, &mut meta),
                    name: unpark_null("name", entry.name, &mut meta),
                    kind: "url".to_string(),
                    url: unpark_null("url", entry.url, &mut meta),
                    meta,
                }
            }
            BookmarkNode::Folder(folder) => folder.into(),
        }
    }
}

impl From<FolderNode> for RawNode {
    fn from(folder: FolderNode) -> Self {
        let mut meta = folder.meta;
        RawNode {
            children: unpark_null("children", folder.children, &mut meta),
            name: unpark_null("name", folder.name, &mut meta),
            kind: "folder".to_string(),
            url: unpark_null("url", None, &mut meta),
            meta,
        }
    }
}

/// A complete bookmark file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Chrome's integrity checksum. Passed through, never recomputed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<Value>,
    /// Named top-level folders (`bookmark_bar`, `other`, `synced`, …).
    pub roots: BTreeMap<String, FolderNode>,
    /// Other top-level fields, e.g. `sync_metadata`.
    #[serde(flatten)]
    pub extra: Metadata,
    /// Format version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
}

impl Document {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `TidyError::InputParse` for malformed JSON and for nodes whose
    /// `type` tag disagrees with their fields.
    pub fn from_json(json: &str) -> TidyResult<Self> {
        serde_json::from_str(json).map_err(|e| TidyError::InputParse {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a bookmark file.
    pub fn load(path: &Path) -> TidyResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| TidyError::InputRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> TidyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document to `path`, replacing any existing file.
    pub fn save(&self, path: &Path) -> TidyResult<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|e| TidyError::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Largest numeric `id` across all roots.
    pub fn max_id(&self) -> u64 {
        self.roots.values().map(FolderNode::max_id).max().unwrap_or(0)
    }
}
