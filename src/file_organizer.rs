/// Organizing pass over a target directory.
///
/// The organizer enumerates the direct children of the target directory,
/// classifies each regular file, resolves a collision-free destination in
/// the matching category folder, moves the file, and collects a move record
/// for the log. Per-file failures are skipped with a diagnostic so one
/// stubborn file never aborts the run.
use crate::config::CompiledFilters;
use crate::extract;
use crate::file_category::{Category, Classifier};
use crate::move_log::{self, LOG_FILE_NAME, MoveRecord};
use crate::output::OutputFormatter;
use crate::path_resolver::resolve_destination;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Behavior switches for one organizing pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// Compute and report every move without touching filesystem or log.
    pub dry_run: bool,
    /// Extract zip/tar archives after moving them into Archives.
    pub extract_archives: bool,
}

/// Errors raised during an organizing pass.
///
/// Only `InvalidTarget` aborts a run; the per-file variants are downgraded
/// to skip entries in the report.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target path is missing or not a directory.
    InvalidTarget { path: PathBuf },
    /// A category directory could not be created.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A file could not be moved to its resolved destination.
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// The path resolver ran out of rename candidates for a file.
    CollisionExhausted { path: PathBuf },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTarget { path } => {
                write!(
                    f,
                    "Target path does not exist or is not a directory: {}",
                    path.display()
                )
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::MoveFailed {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::CollisionExhausted { path } => {
                write!(
                    f,
                    "Could not find a collision-free destination for {}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for organizing operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// One classified move, either performed or (in dry-run mode) synthesized.
#[derive(Debug, Clone)]
pub struct PlannedMove {
    /// The source → destination pair as recorded in the log.
    pub record: MoveRecord,
    /// The category the file was filed under.
    pub category: Category,
}

/// Outcome of one organizing pass.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Moves performed (or synthesized), in processing order.
    pub moved: Vec<PlannedMove>,
    /// Files skipped because of per-file failures, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
    /// Archives that moved fine but failed to extract.
    pub extraction_warnings: Vec<(PathBuf, String)>,
    /// Set when the move log could not be written after the pass.
    pub log_warning: Option<String>,
}

impl OrganizeReport {
    /// Number of files moved (or, in a dry run, that would be moved).
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    /// Per-category folder-name counts for the summary table.
    pub fn category_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for planned in &self.moved {
            *counts
                .entry(planned.category.dir_name().to_string())
                .or_insert(0) += 1;
        }
        counts
    }
}

/// Runs organizing passes over target directories.
pub struct FileOrganizer {
    classifier: Classifier,
    filters: CompiledFilters,
    options: OrganizeOptions,
}

impl FileOrganizer {
    pub fn new(classifier: Classifier, filters: CompiledFilters, options: OrganizeOptions) -> Self {
        Self {
            classifier,
            filters,
            options,
        }
    }

    /// Organizes the direct children of `target_dir` into category folders.
    ///
    /// Fails with `InvalidTarget` before any mutation if the target is
    /// missing or not a directory. Every other failure is per-file: the file
    /// is skipped, reported, and left out of the move log. After a non-dry
    /// pass with at least one move, all collected records are appended to
    /// the move log in processing order; a log-write failure downgrades to a
    /// warning on the report.
    pub fn organize(&self, target_dir: &Path) -> OrganizeResult<OrganizeReport> {
        if !target_dir.is_dir() {
            return Err(OrganizeError::InvalidTarget {
                path: target_dir.to_path_buf(),
            });
        }

        let files = self.eligible_files(target_dir)?;
        let mut report = OrganizeReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        let progress = (!self.options.dry_run && !files.is_empty())
            .then(|| OutputFormatter::create_progress_bar(files.len() as u64));

        for path in &files {
            match self.place_file(target_dir, path) {
                Ok(planned) => {
                    let line = format!(
                        "{} -> {}/",
                        display_name(path),
                        planned.category.dir_name()
                    );
                    if let Some(pb) = &progress {
                        pb.println(format!("  {line}"));
                    } else {
                        OutputFormatter::dry_run_notice(&line);
                    }

                    if self.options.extract_archives && planned.category == Category::Archives {
                        self.run_extraction_hook(&planned, progress.as_ref(), &mut report);
                    }

                    report.moved.push(planned);
                }
                Err(e) => {
                    let reason = e.to_string();
                    if let Some(pb) = &progress {
                        pb.println(format!("  skipped: {reason}"));
                    } else {
                        OutputFormatter::warning(&format!("skipped: {reason}"));
                    }
                    report.skipped.push((path.clone(), reason));
                }
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if !self.options.dry_run && !report.moved.is_empty() {
            let records = report.moved.iter().map(|p| p.record.clone()).collect();
            if let Err(e) = move_log::append(target_dir, records) {
                report.log_warning = Some(e.to_string());
            }
        }

        Ok(report)
    }

    /// Enumerates direct-child regular files eligible for this pass, sorted
    /// by name so processing order is deterministic across platforms.
    fn eligible_files(&self, target_dir: &Path) -> OrganizeResult<Vec<PathBuf>> {
        let entries = fs::read_dir(target_dir).map_err(|_| OrganizeError::InvalidTarget {
            path: target_dir.to_path_buf(),
        })?;

        let mut files = Vec::new();
        for entry in entries.flatten() {
            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
            {
                let name = entry.file_name();
                // The log itself is never a candidate, hidden or not.
                if name.to_string_lossy() == LOG_FILE_NAME {
                    continue;
                }
                if self.filters.should_include(Path::new(&name)) {
                    files.push(entry.path());
                }
            }
        }

        files.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
        Ok(files)
    }

    /// Classifies one file and moves it (or synthesizes the move in a dry
    /// run) into its category folder.
    fn place_file(&self, target_dir: &Path, file_path: &Path) -> OrganizeResult<PlannedMove> {
        let category = self.classifier.categorize_path(file_path);
        let category_dir = target_dir.join(category.dir_name());

        if !self.options.dry_run && !category_dir.exists() {
            fs::create_dir(&category_dir).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: category_dir.clone(),
                source: e,
            })?;
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::InvalidTarget {
                path: file_path.to_path_buf(),
            })?;
        let desired = category_dir.join(file_name);
        let destination =
            resolve_destination(&desired).map_err(|e| OrganizeError::CollisionExhausted {
                path: e.path,
            })?;

        if !self.options.dry_run {
            fs::rename(file_path, &destination).map_err(|e| OrganizeError::MoveFailed {
                source: file_path.to_path_buf(),
                destination: destination.clone(),
                source_error: e,
            })?;
        }

        Ok(PlannedMove {
            record: MoveRecord {
                source: file_path.to_path_buf(),
                destination,
            },
            category,
        })
    }

    /// Post-move extraction. Failures are warnings; the move stands and the
    /// record stays in the log.
    fn run_extraction_hook(
        &self,
        planned: &PlannedMove,
        progress: Option<&indicatif::ProgressBar>,
        report: &mut OrganizeReport,
    ) {
        let archive = &planned.record.destination;

        if self.options.dry_run {
            if extract::is_supported_archive(archive) {
                OutputFormatter::dry_run_notice(&format!(
                    "would extract {}",
                    display_name(archive)
                ));
            }
            return;
        }

        match extract::extract_archive(archive) {
            Ok(Some(dir)) => {
                let line = format!("extracted {} -> {}/", display_name(archive), display_name(&dir));
                if let Some(pb) = progress {
                    pb.println(format!("  {line}"));
                } else {
                    OutputFormatter::info(&line);
                }
            }
            Ok(None) => {}
            Err(e) => {
                let reason = e.to_string();
                if let Some(pb) = progress {
                    pb.println(format!("  warning: {reason}"));
                } else {
                    OutputFormatter::warning(&reason);
                }
                report.extraction_warnings.push((archive.clone(), reason));
            }
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use tempfile::TempDir;

    fn organizer(options: OrganizeOptions) -> FileOrganizer {
        let filters = FilterConfig::default()
            .compile()
            .expect("default config should compile");
        FileOrganizer::new(Classifier::new(), filters, options)
    }

    #[test]
    fn test_invalid_target_is_fatal() {
        let result = organizer(OrganizeOptions::default()).organize(Path::new("/no/such/dir"));
        assert!(matches!(result, Err(OrganizeError::InvalidTarget { .. })));
    }

    #[test]
    fn test_file_target_is_invalid() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").expect("Failed to write file");

        let result = organizer(OrganizeOptions::default()).organize(&file);
        assert!(matches!(result, Err(OrganizeError::InvalidTarget { .. })));
    }

    #[test]
    fn test_moves_files_into_category_folders() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("report.pdf"), "pdf").expect("write");
        fs::write(base.join("photo.jpg"), "jpg").expect("write");
        fs::write(base.join("mystery.qqq"), "???").expect("write");

        let report = organizer(OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");

        assert_eq!(report.moved_count(), 3);
        assert!(base.join("PDFs").join("report.pdf").exists());
        assert!(base.join("Images").join("photo.jpg").exists());
        assert!(base.join("Other").join("mystery.qqq").exists());
        assert!(!base.join("report.pdf").exists());
    }

    #[test]
    fn test_appends_records_to_the_move_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("write");
        fs::write(base.join("b.txt"), "b").expect("write");

        organizer(OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");

        let records = move_log::load(base).expect("load failed");
        assert_eq!(records.len(), 2);
        // Deterministic name order.
        assert_eq!(records[0].source, base.join("a.txt"));
        assert_eq!(records[1].source, base.join("b.txt"));
    }

    #[test]
    fn test_log_file_is_never_organized() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("write");

        organizer(OrganizeOptions::default())
            .organize(base)
            .expect("first organize failed");
        // Second pass sees only the log file and the category folder.
        let report = organizer(OrganizeOptions::default())
            .organize(base)
            .expect("second organize failed");

        assert_eq!(report.moved_count(), 0);
        assert!(move_log::log_path(base).exists());
        // Log still holds the first run's record, untouched.
        assert_eq!(move_log::load(base).expect("load failed").len(), 1);
    }

    #[test]
    fn test_collision_gets_numbered_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("Documents")).expect("mkdir");
        fs::write(base.join("Documents").join("notes.txt"), "old").expect("write");
        fs::write(base.join("notes.txt"), "new").expect("write");

        let report = organizer(OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");

        assert_eq!(report.moved_count(), 1);
        assert_eq!(
            report.moved[0].record.destination,
            base.join("Documents").join("notes_1.txt")
        );
        assert!(base.join("Documents").join("notes_1.txt").exists());
    }

    #[test]
    fn test_dry_run_mutates_nothing_but_reports_moves() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("report.pdf"), "pdf").expect("write");
        fs::write(base.join("photo.jpg"), "jpg").expect("write");

        let report = organizer(OrganizeOptions {
            dry_run: true,
            ..Default::default()
        })
        .organize(base)
        .expect("dry run failed");

        assert!(report.dry_run);
        assert_eq!(report.moved_count(), 2);
        // Same classification decisions a real run would make.
        assert!(
            report
                .moved
                .iter()
                .any(|p| p.category == Category::Pdfs
                    && p.record.destination == base.join("PDFs").join("report.pdf"))
        );
        // No folders, no moves, no log.
        assert!(base.join("report.pdf").exists());
        assert!(!base.join("PDFs").exists());
        assert!(!move_log::log_path(base).exists());
    }

    #[test]
    fn test_hidden_and_temp_files_skipped_by_default() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join(".hidden.txt"), "h").expect("write");
        fs::write(base.join("~lock.docx"), "l").expect("write");
        fs::write(base.join("visible.txt"), "v").expect("write");

        let report = organizer(OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");

        assert_eq!(report.moved_count(), 1);
        assert!(base.join(".hidden.txt").exists());
        assert!(base.join("~lock.docx").exists());
    }

    #[test]
    fn test_directories_are_left_alone() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::create_dir(base.join("projects.pdf")).expect("mkdir");
        fs::write(base.join("real.pdf"), "pdf").expect("write");

        let report = organizer(OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");

        assert_eq!(report.moved_count(), 1);
        assert!(base.join("projects.pdf").is_dir());
    }

    #[test]
    fn test_category_counts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.jpg"), "a").expect("write");
        fs::write(base.join("b.jpg"), "b").expect("write");
        fs::write(base.join("c.pdf"), "c").expect("write");

        let report = organizer(OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");

        let counts = report.category_counts();
        assert_eq!(counts.get("Images"), Some(&2));
        assert_eq!(counts.get("PDFs"), Some(&1));
    }
}
