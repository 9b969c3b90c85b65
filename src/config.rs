//! Classification rules and how they are loaded.
//!
//! A rule set maps category names to keyword lists. Order matters: when a
//! bookmark matches keywords of several categories, the category listed first
//! wins. Rules files are plain JSON objects, or TOML tables when the file ends
//! in `.toml`:
//!
//! ```toml
//! Technology = ["github", "rust", "docker"]
//! News = ["bbc", "nytimes"]
//! ```
//!
//! Loading never aborts a run: callers fall back to [`RuleSet::default`] and
//! report the [`ConfigError`] as a warning.

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a rules file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Rules file not found at the specified path.
    #[error("Rules file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// The file could not be read.
    #[error("IO error reading rules file '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Invalid JSON/TOML syntax or structure.
    #[error("Invalid rules file '{}': {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },
    /// The same category name was given twice.
    #[error("Duplicate category '{0}'")]
    DuplicateCategory(String),
}

/// One category and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    /// Category name, also used as the output folder name.
    pub name: String,
    /// Keywords, matched as case-insensitive substrings.
    pub keywords: Vec<String>,
}

/// Ordered mapping from category name to keyword list.
///
/// Category names are unique. Iteration follows insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    categories: Vec<CategoryRule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Appends a category.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateCategory` if `name` is already present.
    pub fn insert<I, S>(&mut self, name: impl Into<String>, keywords: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(ConfigError::DuplicateCategory(name));
        }
        self.categories.push(CategoryRule {
            name,
            keywords: keywords.into_iter().map(Into::into).collect(),
        });
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert) for literal rule tables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateCategory` on a repeated name.
    pub fn with<I, S>(mut self, name: impl Into<String>, keywords: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, keywords)?;
        Ok(self)
    }

    /// Returns true if a category with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|rule| rule.name == name)
    }

    /// Categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryRule> {
        self.categories.iter()
    }

    /// Category names in lexicographic order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.iter().map(|r| r.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns true if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Finds the rules file to use, if any.
    ///
    /// Looks in the following order:
    /// 1. `config_path`, when given (returned even if it does not exist)
    /// 2. `.marktidy.json`, then `.marktidy.toml`, in the current directory
    /// 3. `rules.json`, then `rules.toml`, in `<config dir>/marktidy/`
    pub fn locate(config_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.to_path_buf());
        }

        let local = [".marktidy.json", ".marktidy.toml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists());
        if local.is_some() {
            return local;
        }

        let config_dir = dirs::config_dir()?.join("marktidy");
        ["rules.json", "rules.toml"]
            .into_iter()
            .map(|name| config_dir.join(name))
            .find(|p| p.exists())
    }

    /// Loads rules from the located file, or the built-in defaults if there
    /// is none.
    ///
    /// # Errors
    ///
    /// Returns an error if a rules file was found or given but cannot be read
    /// or parsed. Callers are expected to fall back to the defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::locate(config_path) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads rules from a specific file. `.toml` files are read as TOML,
    /// everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist,
    /// `ConfigError::IoError` if it cannot be read and
    /// `ConfigError::ConfigInvalid` if it does not parse.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed = if is_toml {
            toml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }
}

impl Default for RuleSet {
    /// The built-in rule set: eight general-purpose categories.
    fn default() -> Self {
        let defaults: [(&str, &[&str]); 8] = [
            (
                "Technology",
                &[
                    "github", "stackoverflow", "tech", "programming", "code", "dev", "python",
                    "javascript", "java", "api", "docker", "kubernetes",
                ],
            ),
            (
                "Entertainment",
                &[
                    "youtube", "netflix", "movie", "video", "music", "spotify", "gaming", "game",
                    "steam", "twitch",
                ],
            ),
            (
                "News",
                &["news", "bbc", "cnn", "nytimes", "medium", "blog", "article"],
            ),
            (
                "Education",
                &[
                    "learn", "course", "tutorial", "mooc", "coursera", "edx", "education", "study",
                    "university", ".edu",
                ],
            ),
            (
                "Tools",
                &[
                    "tool", "utility", "converter", "generator", "extension", "chrome",
                    "productivity",
                ],
            ),
            (
                "Shopping",
                &["amazon", "ebay", "shop", "store", "buy", "shopping", "alibaba", "etsy"],
            ),
            (
                "Social",
                &[
                    "facebook", "twitter", "instagram", "linkedin", "reddit", "social",
                    "community", "forum",
                ],
            ),
            (
                "Books",
                &[
                    "book", "library", "reading", "goodreads", "kindle", "ebook", "pdf",
                    "literature",
                ],
            ),
        ];

        Self {
            categories: defaults
                .iter()
                .map(|(name, keywords)| CategoryRule {
                    name: (*name).to_string(),
                    keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
                })
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category names to keyword lists")
            }

            fn visit_map<A>(self, mut map: A) -> Result<RuleSet, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut rules = RuleSet::new();
                while let Some((name, keywords)) = map.next_entry::<String, Vec<String>>()? {
                    rules.insert(name, keywords).map_err(de::Error::custom)?;
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}
