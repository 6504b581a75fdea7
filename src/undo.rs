/// Reverse replay of the move log.
///
/// Undo walks the recorded moves newest-first, relocating each file from its
/// recorded destination back into its original parent directory. Later moves
/// are reversed first so they cannot shadow the destinations of earlier
/// ones. The log is cleared only when no record failed to move back, so a
/// partial undo stays retryable.
use crate::file_organizer::{OrganizeError, OrganizeResult};
use crate::move_log;
use crate::output::OutputFormatter;
use crate::path_resolver::resolve_destination;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of an undo pass.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Number of files moved back (or, in a dry run, that would be).
    pub restored: usize,
    /// Records whose destination no longer exists on disk; nothing to do.
    pub skipped: Vec<(PathBuf, String)>,
    /// Records whose file exists but could not be moved back.
    pub failed: Vec<(PathBuf, String)>,
    /// Whether the log was cleared at the end of the pass.
    pub log_cleared: bool,
}

impl UndoReport {
    /// Total records processed in this pass.
    pub fn total_processed(&self) -> usize {
        self.restored + self.skipped.len() + self.failed.len()
    }

    /// True when there was nothing in the log to begin with.
    pub fn nothing_to_undo(&self) -> bool {
        self.total_processed() == 0
    }
}

/// Replays the move log in reverse.
pub struct UndoEngine;

impl UndoEngine {
    /// Undoes the entire accumulated move log for a target directory.
    ///
    /// The log never promises to match the filesystem: records whose
    /// destination has been moved or deleted externally are skipped and
    /// reported. Files are restored into their original parent directory
    /// (recreated if it disappeared) under a collision-free version of
    /// their current name, which may differ from the original name if the
    /// organizing pass or the undo itself had to rename. With `dry_run`
    /// every intended reversal is reported and nothing is mutated.
    pub fn undo(target_dir: &Path, dry_run: bool) -> OrganizeResult<UndoReport> {
        if !target_dir.is_dir() {
            return Err(OrganizeError::InvalidTarget {
                path: target_dir.to_path_buf(),
            });
        }

        let (records, log_warning) = move_log::load_or_empty(target_dir);
        if let Some(warning) = log_warning {
            OutputFormatter::warning(&format!("{warning}; treating log as empty"));
        }

        let mut report = UndoReport {
            dry_run,
            ..Default::default()
        };
        if records.is_empty() {
            return Ok(report);
        }

        for record in records.iter().rev() {
            let destination = &record.destination;
            if !destination.exists() {
                report.skipped.push((
                    destination.clone(),
                    "no longer exists (moved or removed externally)".to_string(),
                ));
                continue;
            }

            match Self::restore_one(record, dry_run) {
                Ok(restored_to) => {
                    report.restored += 1;
                    if dry_run {
                        OutputFormatter::dry_run_notice(&format!(
                            "would move {} back to {}",
                            destination.display(),
                            restored_to.display()
                        ));
                    } else {
                        OutputFormatter::info(&format!(
                            "restored {} -> {}",
                            destination.display(),
                            restored_to.display()
                        ));
                    }
                }
                Err(reason) => {
                    OutputFormatter::error(&format!("{}: {}", destination.display(), reason));
                    report.failed.push((destination.clone(), reason));
                }
            }
        }

        // A skipped record cannot be retried, so skips alone do not keep
        // the log alive; failures do.
        if !dry_run && report.failed.is_empty() {
            match move_log::clear(target_dir) {
                Ok(()) => report.log_cleared = true,
                Err(e) => OutputFormatter::warning(&format!("Could not clear move log: {e}")),
            }
        }

        Ok(report)
    }

    /// Moves one recorded destination back into its original parent.
    ///
    /// Returns the path the file was (or would be) restored to.
    fn restore_one(record: &move_log::MoveRecord, dry_run: bool) -> Result<PathBuf, String> {
        let parent = record
            .source
            .parent()
            .ok_or_else(|| "original location has no parent directory".to_string())?;

        if !parent.exists() && !dry_run {
            fs::create_dir_all(parent)
                .map_err(|e| format!("could not recreate {}: {}", parent.display(), e))?;
        }

        // Restore under the file's current name; the original may be taken
        // by now, so resolve a fresh collision-free path.
        let current_name = record
            .destination
            .file_name()
            .ok_or_else(|| "recorded destination has no file name".to_string())?;
        let restored_to = resolve_destination(&parent.join(current_name))
            .map_err(|e| e.to_string())?;

        if !dry_run {
            fs::rename(&record.destination, &restored_to)
                .map_err(|e| format!("failed to move back: {e}"))?;
        }

        Ok(restored_to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::file_category::Classifier;
    use crate::file_organizer::{FileOrganizer, OrganizeOptions};
    use crate::move_log::MoveRecord;
    use tempfile::TempDir;

    fn organize(base: &Path) {
        let filters = FilterConfig::default()
            .compile()
            .expect("default config should compile");
        FileOrganizer::new(Classifier::new(), filters, OrganizeOptions::default())
            .organize(base)
            .expect("organize failed");
    }

    #[test]
    fn test_undo_invalid_target() {
        let result = UndoEngine::undo(Path::new("/no/such/dir"), false);
        assert!(matches!(result, Err(OrganizeError::InvalidTarget { .. })));
    }

    #[test]
    fn test_undo_with_no_log_is_a_no_op() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let report = UndoEngine::undo(temp_dir.path(), false).expect("undo failed");

        assert!(report.nothing_to_undo());
        assert!(!report.log_cleared);
        assert!(!move_log::log_path(temp_dir.path()).exists());
    }

    #[test]
    fn test_undo_restores_files_and_clears_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("report.pdf"), "pdf").expect("write");
        fs::write(base.join("photo.jpg"), "jpg").expect("write");
        organize(base);
        assert!(!base.join("report.pdf").exists());

        let report = UndoEngine::undo(base, false).expect("undo failed");

        assert_eq!(report.restored, 2);
        assert!(report.failed.is_empty());
        assert!(report.log_cleared);
        assert!(base.join("report.pdf").exists());
        assert!(base.join("photo.jpg").exists());
        assert!(move_log::load(base).expect("load failed").is_empty());
    }

    #[test]
    fn test_undo_skips_externally_removed_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("a.txt"), "a").expect("write");
        fs::write(base.join("b.txt"), "b").expect("write");
        organize(base);
        fs::remove_file(base.join("Documents").join("a.txt")).expect("remove");

        let report = UndoEngine::undo(base, false).expect("undo failed");

        assert_eq!(report.restored, 1);
        assert_eq!(report.skipped.len(), 1);
        // Skips do not block clearing: nothing is left to retry.
        assert!(report.log_cleared);
        assert!(base.join("b.txt").exists());
    }

    #[test]
    fn test_undo_resolves_collisions_in_the_original_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("notes.txt"), "original").expect("write");
        organize(base);
        // Something new claimed the original name while the file was away.
        fs::write(base.join("notes.txt"), "newcomer").expect("write");

        let report = UndoEngine::undo(base, false).expect("undo failed");

        assert_eq!(report.restored, 1);
        // Contents came back to the directory, under a renamed path.
        assert_eq!(
            fs::read_to_string(base.join("notes.txt")).expect("read"),
            "newcomer"
        );
        assert_eq!(
            fs::read_to_string(base.join("notes_1.txt")).expect("read"),
            "original"
        );
    }

    #[test]
    fn test_undo_recreates_missing_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let stashed = base.join("Documents").join("a.txt");
        fs::create_dir(base.join("Documents")).expect("mkdir");
        fs::write(&stashed, "a").expect("write");
        // The recorded original parent never existed in this fixture.
        move_log::append(
            base,
            vec![MoveRecord {
                source: base.join("gone").join("a.txt"),
                destination: stashed,
            }],
        )
        .expect("append");

        let report = UndoEngine::undo(base, false).expect("undo failed");

        assert_eq!(report.restored, 1);
        assert!(report.log_cleared);
        assert!(base.join("gone").join("a.txt").exists());
    }

    #[test]
    fn test_dry_run_undo_keeps_everything_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("report.pdf"), "pdf").expect("write");
        organize(base);

        let report = UndoEngine::undo(base, true).expect("dry-run undo failed");

        assert!(report.dry_run);
        assert_eq!(report.restored, 1);
        assert!(!report.log_cleared);
        assert!(base.join("PDFs").join("report.pdf").exists());
        assert_eq!(move_log::load(base).expect("load failed").len(), 1);
    }

    #[test]
    fn test_failed_restore_keeps_the_log() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        // A record whose destination exists but whose source parent cannot
        // be created (a file stands where the directory should go).
        fs::write(base.join("blocker"), "in the way").expect("write");
        let stashed = base.join("stashed.txt");
        fs::write(&stashed, "contents").expect("write");
        move_log::append(
            base,
            vec![MoveRecord {
                source: base.join("blocker").join("stashed.txt"),
                destination: stashed.clone(),
            }],
        )
        .expect("append");

        let report = UndoEngine::undo(base, false).expect("undo failed");

        assert_eq!(report.restored, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.log_cleared);
        // The record survives for a retry.
        assert_eq!(move_log::load(base).expect("load failed").len(), 1);
        assert!(stashed.exists());
    }

    #[test]
    fn test_reverse_order_prevents_destination_shadowing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        // Two runs: the same name moved twice, second run renamed it.
        fs::write(base.join("note.txt"), "first").expect("write");
        organize(base);
        fs::write(base.join("note.txt"), "second").expect("write");
        organize(base);
        assert!(base.join("Documents").join("note.txt").exists());
        assert!(base.join("Documents").join("note_1.txt").exists());

        let report = UndoEngine::undo(base, false).expect("undo failed");

        assert_eq!(report.restored, 2);
        // Newest move (note_1.txt) undone first, reclaiming the bare name;
        // the older move then resolves around it.
        assert_eq!(
            fs::read_to_string(base.join("note_1.txt")).expect("read"),
            "second"
        );
        assert_eq!(
            fs::read_to_string(base.join("note.txt")).expect("read"),
            "first"
        );
    }
}
