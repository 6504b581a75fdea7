//! Command-line surface.
//!
//! Maps flags 1:1 onto the organizer and undo engine, resolves the default
//! target (the user's desktop), and prints run reports. Exit codes: 2 for an
//! invalid target directory, 1 for unusable configuration, 0 for everything
//! else — per-file skips and extraction warnings never fail a run.

use crate::config::FilterConfig;
use crate::file_category::Classifier;
use crate::file_organizer::{FileOrganizer, OrganizeError, OrganizeOptions, OrganizeReport};
use crate::move_log::LOG_FILE_NAME;
use crate::output::OutputFormatter;
use crate::undo::{UndoEngine, UndoReport};
use clap::Parser;
use directories::UserDirs;
use std::path::PathBuf;

/// Organize a folder into category subdirectories, with undo.
///
/// Concurrent invocations against the same target directory are
/// unsupported; run one desksort at a time per folder.
#[derive(Debug, Parser)]
#[command(name = "desksort", version, about)]
pub struct Cli {
    /// Target folder to organize (default: your desktop)
    pub path: Option<PathBuf>,

    /// Also organize hidden dotfiles and ~-prefixed temp files
    #[arg(long)]
    pub include_hidden: bool,

    /// Preview every move without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Extract moved zip/tar archives into sibling folders
    #[arg(long)]
    pub extract_archives: bool,

    /// Undo the entire recorded move log for the target folder
    #[arg(long)]
    pub undo: bool,

    /// Filter configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Runs the parsed command and returns the process exit code.
pub fn run(cli: Cli) -> i32 {
    let target = match cli.path.clone().or_else(default_desktop) {
        Some(path) => path,
        None => {
            OutputFormatter::error("No target given and no desktop folder could be located.");
            return 2;
        }
    };
    // Records should carry absolute paths; fall back to the raw path so the
    // organizer can produce its own InvalidTarget diagnostic.
    let target = target.canonicalize().unwrap_or(target);

    if cli.undo {
        return run_undo(&target, cli.dry_run);
    }

    let config = match FilterConfig::load(cli.config.as_deref()) {
        Ok(mut config) => {
            config.filters.include_hidden |= cli.include_hidden;
            config
        }
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            return 1;
        }
    };
    let filters = match config.compile() {
        Ok(filters) => filters,
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            return 1;
        }
    };

    let organizer = FileOrganizer::new(
        Classifier::new(),
        filters,
        OrganizeOptions {
            dry_run: cli.dry_run,
            extract_archives: cli.extract_archives,
        },
    );

    if cli.dry_run {
        OutputFormatter::info(&format!("DRY RUN: analyzing {}", target.display()));
    } else {
        OutputFormatter::info(&format!("Organizing {}", target.display()));
    }

    match organizer.organize(&target) {
        Ok(report) => {
            print_organize_report(&report);
            0
        }
        Err(e @ OrganizeError::InvalidTarget { .. }) => {
            OutputFormatter::error(&e.to_string());
            2
        }
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            1
        }
    }
}

fn run_undo(target: &std::path::Path, dry_run: bool) -> i32 {
    match UndoEngine::undo(target, dry_run) {
        Ok(report) => {
            print_undo_report(&report);
            0
        }
        Err(e @ OrganizeError::InvalidTarget { .. }) => {
            OutputFormatter::error(&e.to_string());
            2
        }
        Err(e) => {
            OutputFormatter::error(&e.to_string());
            1
        }
    }
}

fn print_organize_report(report: &OrganizeReport) {
    if report.moved.is_empty() && report.skipped.is_empty() {
        OutputFormatter::info("No files to organize.");
        return;
    }

    OutputFormatter::summary_table(&report.category_counts(), report.moved_count());

    if !report.skipped.is_empty() {
        OutputFormatter::warning(&format!(
            "{} file(s) skipped; see diagnostics above.",
            report.skipped.len()
        ));
    }
    for (path, reason) in &report.extraction_warnings {
        OutputFormatter::warning(&format!(
            "extraction failed for {}: {} (the move itself stands)",
            path.display(),
            reason
        ));
    }
    if let Some(warning) = &report.log_warning {
        OutputFormatter::warning(&format!(
            "Could not save the move log: {warning}. Undo may be unavailable for this run."
        ));
    }

    if report.dry_run {
        OutputFormatter::dry_run_notice(&format!(
            "would log {} move(s); nothing was changed.",
            report.moved_count()
        ));
    } else if report.moved_count() > 0 && report.log_warning.is_none() {
        OutputFormatter::success(&format!(
            "Organized {} file(s). Log written to {}; run with --undo to revert.",
            report.moved_count(),
            LOG_FILE_NAME
        ));
    }
}

fn print_undo_report(report: &UndoReport) {
    if report.nothing_to_undo() {
        OutputFormatter::info("Nothing to undo.");
        return;
    }

    OutputFormatter::header("UNDO");
    println!("  Restored: {}", report.restored);

    if !report.skipped.is_empty() {
        println!("  Skipped:  {}", report.skipped.len());
        for (path, reason) in &report.skipped {
            OutputFormatter::warning(&format!("{}: {}", path.display(), reason));
        }
    }
    if !report.failed.is_empty() {
        println!("  Failed:   {}", report.failed.len());
        OutputFormatter::warning(
            "The move log was kept because some records failed; fix the issues and retry --undo.",
        );
    } else if report.dry_run {
        OutputFormatter::dry_run_notice("no files were moved and the log was kept.");
    } else if report.log_cleared {
        OutputFormatter::success("Undo complete; move log cleared.");
    }
}

/// Best-effort desktop folder, the default organizing target.
fn default_desktop() -> Option<PathBuf> {
    let user_dirs = UserDirs::new()?;
    user_dirs
        .desktop_dir()
        .map(|p| p.to_path_buf())
        .or_else(|| Some(user_dirs.home_dir().join("Desktop")))
}
