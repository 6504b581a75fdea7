//! Durable move log for organize runs.
//!
//! Every relocation performed in a target directory is recorded as a
//! `{source, destination}` pair in a JSON document colocated with that
//! directory. The log is append-only across organize runs and is cleared
//! only after a fully successful undo pass. Writes go through a temp file
//! plus rename so no partial log is ever observable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reserved log file name; always excluded from classification.
pub const LOG_FILE_NAME: &str = ".desksort_log.json";

/// A single relocation: where the file was, and where it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Absolute path of the file before the move.
    pub source: PathBuf,
    /// Absolute path of the file after the move.
    pub destination: PathBuf,
}

/// On-disk shape of the log file.
#[derive(Debug, Serialize, Deserialize)]
struct LogDocument {
    /// When the log was last written.
    saved_at: DateTime<Utc>,
    /// All recorded moves, oldest first.
    records: Vec<MoveRecord>,
}

/// Errors raised by log persistence.
#[derive(Debug)]
pub enum LogError {
    /// The log file exists but could not be read.
    Read { path: PathBuf, source: std::io::Error },
    /// The log file contents are not a valid log document.
    Corrupt { path: PathBuf, reason: String },
    /// The log file could not be written or replaced.
    Write { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "Failed to read move log {}: {}", path.display(), source)
            }
            Self::Corrupt { path, reason } => {
                write!(f, "Move log {} is unreadable: {}", path.display(), reason)
            }
            Self::Write { path, source } => {
                write!(f, "Failed to write move log {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for LogError {}

/// Returns the path of the move log for a target directory.
pub fn log_path(target_dir: &Path) -> PathBuf {
    target_dir.join(LOG_FILE_NAME)
}

/// Loads the recorded moves for a target directory.
///
/// A missing log file is an empty log. A present-but-unreadable log is an
/// error; callers are expected to downgrade it to an empty log and surface
/// a warning rather than abort.
pub fn load(target_dir: &Path) -> Result<Vec<MoveRecord>, LogError> {
    let path = log_path(target_dir);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(&path).map_err(|e| LogError::Read {
        path: path.clone(),
        source: e,
    })?;

    let document: LogDocument =
        serde_json::from_str(&contents).map_err(|e| LogError::Corrupt {
            path,
            reason: e.to_string(),
        })?;

    Ok(document.records)
}

/// Lenient load: a corrupt or unreadable log is treated as empty, and the
/// underlying error is returned alongside so the caller can warn about it.
pub fn load_or_empty(target_dir: &Path) -> (Vec<MoveRecord>, Option<LogError>) {
    match load(target_dir) {
        Ok(records) => (records, None),
        Err(e) => (Vec::new(), Some(e)),
    }
}

/// Appends records to the log, rewriting the whole document atomically.
///
/// The existing log is loaded leniently, so appending to a corrupt log
/// replaces it with just the new records.
pub fn append(target_dir: &Path, new_records: Vec<MoveRecord>) -> Result<usize, LogError> {
    let (mut records, _) = load_or_empty(target_dir);
    records.extend(new_records);
    let total = records.len();
    save(target_dir, records)?;
    Ok(total)
}

/// Replaces the log with an empty record sequence.
pub fn clear(target_dir: &Path) -> Result<(), LogError> {
    save(target_dir, Vec::new())
}

/// Writes the full document via write-temp-then-rename.
fn save(target_dir: &Path, records: Vec<MoveRecord>) -> Result<(), LogError> {
    let path = log_path(target_dir);
    let document = LogDocument {
        saved_at: Utc::now(),
        records,
    };

    let json = serde_json::to_string_pretty(&document).map_err(|e| LogError::Write {
        path: path.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;

    let temp = NamedTempFile::new_in(target_dir).map_err(|e| LogError::Write {
        path: path.clone(),
        source: e,
    })?;
    fs::write(temp.path(), json).map_err(|e| LogError::Write {
        path: path.clone(),
        source: e,
    })?;
    temp.persist(&path).map_err(|e| LogError::Write {
        path,
        source: e.error,
    })?;

    Ok(())
}
