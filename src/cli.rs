//! Command-line interface module for marktidy.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Input resolution and backup
//! - Rules loading with fallback to the built-in defaults
//! - Organization orchestration and dry runs
//! - Writing the output document and the text report

use crate::backup::{create_backup, resolve_input};
use crate::bookmark::Document;
use crate::classifier::{Classifier, SENSITIVE, UNCATEGORIZED};
use crate::config::RuleSet;
use crate::error::TidyResult;
use crate::organizer::{DEFAULT_TARGET_ROOT, OrganizeOptions, OrganizeReport, organize};
use crate::output::OutputFormatter;
use crate::report::write_report;
use clap::Parser;
use std::path::{Path, PathBuf};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "marktidy")]
#[command(about = "Clean, deduplicate and re-categorize Chrome bookmarks")]
#[command(version)]
pub struct CliArgs {
    /// Input bookmarks file (auto-detected if not specified)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file (default: Bookmarks_clean_optimized_<timestamp>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Custom classification rules file (JSON, or TOML with a .toml extension)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use the built-in rules without looking for a rules file
    #[arg(long, conflicts_with = "config")]
    pub builtin_rules: bool,

    /// Directory for the backup copy of the input
    #[arg(long, default_value = "./bookmarks_backup")]
    pub backup_dir: PathBuf,

    /// Directory for the text report
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,

    /// Disable sensitive content filtering
    #[arg(long)]
    pub no_sensitive_filter: bool,

    /// Show what would be done without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Bookmark root to reorganize
    #[arg(long, default_value = DEFAULT_TARGET_ROOT)]
    pub root: String,
}

/// Files touched by a run, plus its statistics.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The bookmarks file that was read.
    pub input: PathBuf,
    /// Backup copy of the input. `None` on dry runs.
    pub backup: Option<PathBuf>,
    /// Reorganized bookmarks file. `None` on dry runs.
    pub output: Option<PathBuf>,
    /// Text report. `None` on dry runs.
    pub report_path: Option<PathBuf>,
    /// Run statistics.
    pub report: OrganizeReport,
}

/// Runs one organization with the given arguments.
///
/// Steps, in order:
/// 1. Resolve the input file (explicit or auto-detected)
/// 2. Back it up (skipped on dry runs)
/// 3. Load classification rules, falling back to the defaults on any problem
///    (or use the defaults outright with `--builtin-rules`)
/// 4. Parse the document and reorganize the target root
/// 5. Write the new document and the report (skipped on dry runs)
///
/// # Errors
///
/// Any [`TidyError`](crate::error::TidyError) aborts the run. No output file
/// is written unless the reorganization succeeded.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use marktidy::cli::{run_cli, CliArgs};
///
/// let args = CliArgs::parse_from(["marktidy", "--input", "Bookmarks", "--dry-run"]);
/// match run_cli(&args) {
///     Ok(outcome) => println!("{} unique bookmarks", outcome.report.unique),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &CliArgs) -> TidyResult<RunOutcome> {
    let now = chrono::Local::now();
    let stamp = now.format("%Y%m%d_%H%M%S").to_string();

    OutputFormatter::header("Chrome Bookmark Organizer");

    let input = resolve_input(args.input.as_deref())?;
    OutputFormatter::info(&format!("Input file: {}", input.display()));

    let backup = if args.dry_run {
        None
    } else {
        let backup = create_backup(&input, &args.backup_dir, &stamp)?;
        OutputFormatter::success(&format!("Backup created: {}", backup.display()));
        Some(backup)
    };

    let rules = if args.builtin_rules {
        RuleSet::default()
    } else {
        load_rules(args.config.as_deref())
    };
    OutputFormatter::success(&format!("Using {} categories", rules.len()));

    let document = Document::load(&input)?;
    let classifier = Classifier::with_sensitive_filter(rules, !args.no_sensitive_filter);
    let options = OrganizeOptions {
        target_root: args.root.clone(),
        now: now.with_timezone(&chrono::Utc),
        ..OrganizeOptions::default()
    };
    let organized = organize(document, &classifier, &options)?;
    let report = organized.report;

    print_statistics(&report);

    if args.dry_run {
        print_dry_run(&report);
        return Ok(RunOutcome {
            input,
            backup,
            output: None,
            report_path: None,
            report,
        });
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("Bookmarks_clean_optimized_{}.json", stamp)));
    organized.document.save(&output)?;
    OutputFormatter::success(&format!("Saved clean bookmarks: {}", output.display()));

    let generated = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let report_path = write_report(&report, &args.report_dir, &stamp, &generated)?;
    OutputFormatter::success(&format!("Report generated: {}", report_path.display()));

    OutputFormatter::header("Next steps:");
    OutputFormatter::plain("  1. Review the generated report");
    OutputFormatter::plain("  2. Close Chrome and replace its Bookmarks file with the output");
    OutputFormatter::plain("  3. Verify in Chrome's bookmark manager");

    Ok(RunOutcome {
        input,
        backup,
        output: Some(output),
        report_path: Some(report_path),
        report,
    })
}

/// Loads the classification rules, never failing.
///
/// A rules file that is missing or invalid is reported as a warning and the
/// built-in defaults are used instead.
pub fn load_rules(config_path: Option<&Path>) -> RuleSet {
    let Some(path) = RuleSet::locate(config_path) else {
        return RuleSet::default();
    };

    match RuleSet::load_from_file(&path) {
        Ok(rules) => {
            OutputFormatter::success(&format!(
                "Loaded custom classification rules from {}",
                path.display()
            ));
            rules
        }
        Err(e) => {
            OutputFormatter::warning(&format!("Failed to load rules: {}", e));
            OutputFormatter::warning("Using default classification rules...");
            RuleSet::default()
        }
    }
}

/// Prints counts and the per-folder summary table.
fn print_statistics(report: &OrganizeReport) {
    OutputFormatter::header("Bookmarks");
    OutputFormatter::plain(&format!("  Original:   {}", report.total));
    OutputFormatter::plain(&format!("  Duplicates: {}", report.duplicates.len()));
    OutputFormatter::plain(&format!("  Unique:     {}", report.unique));

    let mut rows = report.category_counts.clone();
    if report.sensitive > 0 {
        rows.push((format!("{}/{}", UNCATEGORIZED, SENSITIVE), report.sensitive));
    }
    if report.uncategorized > 0 {
        rows.push((UNCATEGORIZED.to_string(), report.uncategorized));
    }
    OutputFormatter::summary_table(&rows, report.unique);

    OutputFormatter::info(&format!(
        "Classification rate: {:.1}%",
        report.classification_rate()
    ));
}

/// Lists where every bookmark would go without writing anything.
fn print_dry_run(report: &OrganizeReport) {
    OutputFormatter::header("DRY RUN: Bookmarks would be organized as follows:");
    for assignment in &report.assignments {
        let keyword = assignment
            .keyword
            .as_ref()
            .map(|k| format!(" (matched '{}')", k))
            .unwrap_or_default();
        OutputFormatter::plain(&format!(" - {} <{}>", assignment.name, assignment.url));
        OutputFormatter::plain(&format!("   → Would file under {}{}", assignment.category, keyword));
    }

    for duplicate in &report.duplicates {
        OutputFormatter::plain(&format!(
            " - {} <{}>",
            duplicate.entry.name(),
            duplicate.entry.url()
        ));
        OutputFormatter::plain("   → Would be removed as a duplicate");
    }

    OutputFormatter::dry_run_notice("Dry run complete. No files were modified.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_args_defaults() {
        let args = CliArgs::parse_from(["marktidy"]);
        assert_eq!(args.input, None);
        assert_eq!(args.backup_dir, PathBuf::from("./bookmarks_backup"));
        assert_eq!(args.report_dir, PathBuf::from("."));
        assert_eq!(args.root, "other");
        assert!(!args.no_sensitive_filter);
        assert!(!args.dry_run);
        assert!(!args.builtin_rules);
    }

    #[test]
    fn test_builtin_rules_conflicts_with_config() {
        let args = CliArgs::parse_from(["marktidy", "--builtin-rules"]);
        assert!(args.builtin_rules);

        let result = CliArgs::try_parse_from(["marktidy", "--builtin-rules", "-c", "rules.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_builtin_rules_ignore_rules_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input = temp_dir.path().join("Bookmarks");
        fs::write(
            &input,
            r#"{"roots": {"other": {"type": "folder", "name": "o", "children": [
                {"type": "url", "name": "Repo", "url": "https://github.com/x"}
            ]}}}"#,
        )
        .expect("Failed to write input");
        let args = CliArgs {
            input: Some(input),
            builtin_rules: true,
            dry_run: true,
            ..CliArgs::parse_from(["marktidy"])
        };

        let outcome = run_cli(&args).expect("Run failed");
        assert_eq!(
            outcome.report.category_counts,
            vec![("Technology".to_string(), 1)]
        );
    }

    #[test]
    fn test_args_all_flags() {
        let args = CliArgs::parse_from([
            "marktidy",
            "-i",
            "in.json",
            "-o",
            "out.json",
            "-c",
            "rules.toml",
            "--backup-dir",
            "bk",
            "--report-dir",
            "reports",
            "--no-sensitive-filter",
            "--dry-run",
            "--root",
            "bookmark_bar",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("in.json")));
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert_eq!(args.config, Some(PathBuf::from("rules.toml")));
        assert_eq!(args.backup_dir, PathBuf::from("bk"));
        assert_eq!(args.report_dir, PathBuf::from("reports"));
        assert!(args.no_sensitive_filter);
        assert!(args.dry_run);
        assert_eq!(args.root, "bookmark_bar");
    }

    #[test]
    fn test_load_rules_falls_back_on_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("rules.json");
        fs::write(&path, "{ not json").expect("Failed to write rules");

        assert_eq!(load_rules(Some(&path)), RuleSet::default());
    }

    #[test]
    fn test_load_rules_falls_back_on_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("missing.json");

        assert_eq!(load_rules(Some(&path)), RuleSet::default());
    }

    #[test]
    fn test_load_rules_uses_custom_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("rules.json");
        fs::write(&path, r#"{"Work": ["jira"]}"#).expect("Failed to write rules");

        let rules = load_rules(Some(&path));
        assert_eq!(rules.len(), 1);
        assert!(rules.contains("Work"));
    }
}
