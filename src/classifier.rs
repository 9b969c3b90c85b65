//! Keyword-based bookmark classification.
//!
//! A bookmark is classified by searching its lowercased URL and name (the
//! "haystack") for keywords. The built-in sensitive-content check runs first
//! and wins over every rule; after that, categories are tried in rule-set
//! order and the first category with any matching keyword is chosen.
//!
//! # Examples
//!
//! ```
//! use marktidy::classifier::{Classification, Classifier};
//! use marktidy::config::RuleSet;
//!
//! let classifier = Classifier::new(RuleSet::default());
//! assert_eq!(
//!     classifier.classify("https://github.com/rust-lang", "Rust").category_name(),
//!     "Technology"
//! );
//! assert_eq!(
//!     classifier.classify("https://example.org", "Example"),
//!     Classification::Unmatched
//! );
//! ```

use crate::bookmark::BookmarkEntry;
use crate::config::RuleSet;

/// Keywords that flag a bookmark as sensitive. Not user-configurable.
pub const SENSITIVE_KEYWORDS: &[&str] = &["adult", "nsfw", "18+", "xxx"];

/// Folder name for sensitive bookmarks.
pub const SENSITIVE: &str = "Sensitive";

/// Folder name for bookmarks no rule matched.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Outcome of classifying one bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'r> {
    /// Caught by the built-in sensitive-content check.
    Sensitive,
    /// Matched a rule.
    Rule {
        /// The winning category.
        category: &'r str,
        /// The first keyword of that category found in the haystack.
        keyword: &'r str,
    },
    /// No rule matched.
    Unmatched,
}

impl Classification<'_> {
    /// The folder this outcome maps to.
    pub fn category_name(&self) -> &str {
        match self {
            Classification::Sensitive => SENSITIVE,
            Classification::Rule { category, .. } => category,
            Classification::Unmatched => UNCATEGORIZED,
        }
    }
}

/// Classifies bookmarks against an injected [`RuleSet`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleSet,
    /// Lowercased keywords per category, in rule order. Empty keywords are
    /// dropped so they cannot match every bookmark.
    lowered: Vec<Vec<String>>,
    sensitive_filter: bool,
}

impl Classifier {
    /// Creates a classifier with the sensitive-content check enabled.
    pub fn new(rules: RuleSet) -> Self {
        Self::with_sensitive_filter(rules, true)
    }

    /// Creates a classifier, choosing whether the sensitive-content check runs.
    ///
    /// With the check disabled every bookmark goes through the rules like any
    /// other, so nothing ends up in the sensitive bucket.
    pub fn with_sensitive_filter(rules: RuleSet, sensitive_filter: bool) -> Self {
        let lowered = rules
            .iter()
            .map(|rule| {
                rule.keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .map(|k| k.to_lowercase())
                    .collect()
            })
            .collect();
        Self {
            rules,
            lowered,
            sensitive_filter,
        }
    }

    /// The rules this classifier was built with.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether the sensitive-content check is enabled.
    pub fn sensitive_filter(&self) -> bool {
        self.sensitive_filter
    }

    /// Classifies a bookmark entry.
    pub fn classify_entry(&self, entry: &BookmarkEntry) -> Classification<'_> {
        self.classify(entry.url(), entry.name())
    }

    /// Classifies a bookmark by URL and name.
    pub fn classify(&self, url: &str, name: &str) -> Classification<'_> {
        let haystack = format!("{} {}", url, name).to_lowercase();

        if self.sensitive_filter && is_sensitive(&haystack) {
            return Classification::Sensitive;
        }

        for (rule, keywords) in self.rules.iter().zip(&self.lowered) {
            if let Some(index) = keywords.iter().position(|k| haystack.contains(k.as_str())) {
                let original = rule
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .nth(index)
                    .map_or("", String::as_str);
                return Classification::Rule {
                    category: &rule.name,
                    keyword: original,
                };
            }
        }

        Classification::Unmatched
    }
}

/// Checks an already-lowercased haystack against [`SENSITIVE_KEYWORDS`].
fn is_sensitive(haystack: &str) -> bool {
    SENSITIVE_KEYWORDS.iter().any(|k| haystack.contains(k))
}
