//! Plain-text report of an organization run.

use crate::classifier::{SENSITIVE, UNCATEGORIZED};
use crate::error::{TidyError, TidyResult};
use crate::organizer::OrganizeReport;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 80;

/// Renders `report` as text. `generated` is printed verbatim as the
/// generation time.
pub fn render_report(report: &OrganizeReport, generated: &str) -> String {
    ReportText { report, generated }.to_string()
}

struct ReportText<'a> {
    report: &'a OrganizeReport,
    generated: &'a str,
}

impl fmt::Display for ReportText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(f, "{}", heavy)?;
        writeln!(f, "Chrome Bookmark Organization Report")?;
        writeln!(f, "{}", heavy)?;
        writeln!(f, "Generated: {}", self.generated)?;
        writeln!(f, "{}\n", heavy)?;

        writeln!(f, "Statistics")?;
        writeln!(f, "{}", light)?;
        writeln!(f, "Original bookmarks: {}", report.total)?;
        writeln!(f, "Duplicates removed: {}", report.duplicates.len())?;
        writeln!(f, "Unique bookmarks: {}", report.unique)?;
        writeln!(f, "Categories created: {}", report.category_counts.len())?;
        writeln!(
            f,
            "Classification rate: {:.1}%\n",
            report.classification_rate()
        )?;

        writeln!(f, "Categories")?;
        writeln!(f, "{}", light)?;
        for (category, count) in &report.category_counts {
            writeln!(f, "{}: {} {}", category, count, bookmark_word(*count))?;
        }
        if report.sensitive > 0 {
            writeln!(
                f,
                "{} (in {}): {} {}",
                SENSITIVE,
                UNCATEGORIZED,
                report.sensitive,
                bookmark_word(report.sensitive)
            )?;
        }
        if report.uncategorized > 0 {
            writeln!(
                f,
                "{}: {} {}",
                UNCATEGORIZED,
                report.uncategorized,
                bookmark_word(report.uncategorized)
            )?;
        }

        if !report.duplicates.is_empty() {
            writeln!(f, "\nDuplicates removed")?;
            writeln!(f, "{}", light)?;
            for duplicate in &report.duplicates {
                write!(f, "{} <{}>", duplicate.entry.name(), duplicate.entry.url())?;
                if !duplicate.original_path.is_empty() {
                    write!(f, " (in {})", duplicate.original_path)?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f, "\n{}", heavy)
    }
}

/// Writes the report to `<dir>/bookmark_organization_report_<stamp>.txt`.
///
/// # Errors
///
/// Returns `TidyError::ReportWrite` if the file cannot be written.
pub fn write_report(
    report: &OrganizeReport,
    dir: &Path,
    stamp: &str,
    generated: &str,
) -> TidyResult<PathBuf> {
    let path = dir.join(format!("bookmark_organization_report_{}.txt", stamp));
    fs::write(&path, render_report(report, generated)).map_err(|e| TidyError::ReportWrite {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

fn bookmark_word(count: usize) -> &'static str {
    if count == 1 { "bookmark" } else { "bookmarks" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::BookmarkEntry;
    use crate::organizer::FlatBookmark;
    use tempfile::TempDir;

    fn sample_report() -> OrganizeReport {
        OrganizeReport {
            total: 6,
            duplicates: vec![FlatBookmark {
                entry: BookmarkEntry::new("repo dup", "http://github.com/x"),
                original_path: "Dev/Old".to_string(),
            }],
            unique: 5,
            category_counts: vec![("News".to_string(), 1), ("Technology".to_string(), 2)],
            sensitive: 1,
            uncategorized: 1,
            assignments: Vec::new(),
        }
    }

    #[test]
    fn test_render_report_statistics() {
        let text = render_report(&sample_report(), "2025-01-01 12:00:00");

        assert!(text.contains("Generated: 2025-01-01 12:00:00"));
        assert!(text.contains("Original bookmarks: 6"));
        assert!(text.contains("Duplicates removed: 1"));
        assert!(text.contains("Unique bookmarks: 5"));
        assert!(text.contains("Categories created: 2"));
        assert!(text.contains("Classification rate: 60.0%"));
    }

    #[test]
    fn test_render_report_categories_and_duplicates() {
        let text = render_report(&sample_report(), "now");

        assert!(text.contains("News: 1 bookmark\n"));
        assert!(text.contains("Technology: 2 bookmarks\n"));
        assert!(text.contains("Sensitive (in Uncategorized): 1 bookmark\n"));
        assert!(text.contains("Uncategorized: 1 bookmark\n"));
        assert!(text.contains("repo dup <http://github.com/x> (in Dev/Old)"));
    }

    #[test]
    fn test_render_report_omits_empty_sections() {
        let report = OrganizeReport::default();
        let text = render_report(&report, "now");

        assert!(!text.contains("Uncategorized:"));
        assert!(!text.contains("Sensitive"));
        assert!(!text.contains("Duplicates removed\n"));
        assert!(text.contains("Classification rate: 0.0%"));
    }

    #[test]
    fn test_render_report_top_level_duplicate_has_no_location() {
        let mut report = sample_report();
        report.duplicates[0].original_path = String::new();
        let text = render_report(&report, "now");

        assert!(text.contains("repo dup <http://github.com/x>\n"));
        assert!(text.ends_with(&format!("\n{}\n", "=".repeat(80))));
    }

    #[test]
    fn test_write_report_creates_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_report(&sample_report(), temp_dir.path(), "20250101_120000", "now")
            .expect("Failed to write report");

        assert_eq!(
            path,
            temp_dir
                .path()
                .join("bookmark_organization_report_20250101_120000.txt")
        );
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(80)));
    }

    #[test]
    fn test_write_report_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let result = write_report(
            &sample_report(),
            &temp_dir.path().join("missing"),
            "stamp",
            "now",
        );
        assert!(matches!(result, Err(TidyError::ReportWrite { .. })));
    }
}
