//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! section headers and the per-category summary table.

use colored::*;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Summary tables with bookmark counts per folder
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use marktidy::output::OutputFormatter;
    /// OutputFormatter::success("Backup created");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a summary table of bookmark counts per folder.
    ///
    /// Rows are printed in the order given.
    ///
    /// # Arguments
    ///
    /// * `rows` - Folder names and their bookmark counts
    /// * `total` - Total number of bookmarks kept
    ///
    /// # Example
    ///
    /// ```no_run
    /// use marktidy::output::OutputFormatter;
    ///
    /// let rows = vec![("News".to_string(), 15), ("Technology".to_string(), 8)];
    /// OutputFormatter::summary_table(&rows, 23);
    /// ```
    pub fn summary_table(rows: &[(String, usize)], total: usize) {
        Self::header("SUMMARY");

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // At least "Folder" width

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Bookmarks".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 14));

        for (name, count) in rows {
            println!(
                "{:<width$} | {}",
                name,
                count.to_string().green(),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 14));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            total.to_string().green().bold(),
            width = width
        );
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
