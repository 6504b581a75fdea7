//! Archive extraction hook.
//!
//! After a file is moved into the Archives category, the organizer can hand
//! it to this module for extraction into a sibling directory named after the
//! archive stem. Extraction is strictly best-effort: failures are reported
//! to the caller as errors to warn about, never propagated as run failures,
//! and any partially extracted output is left in place.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Errors raised while extracting an archive.
#[derive(Debug)]
pub enum ExtractError {
    /// Filesystem error opening the archive or creating the output folder.
    Io { path: PathBuf, source: std::io::Error },
    /// The zip archive could not be read.
    Zip { path: PathBuf, source: zip::result::ZipError },
    /// The tar archive could not be unpacked.
    Tar { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Failed to access {}: {}", path.display(), source)
            }
            Self::Zip { path, source } => {
                write!(f, "Failed to extract zip {}: {}", path.display(), source)
            }
            Self::Tar { path, source } => {
                write!(f, "Failed to extract tar {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// The archive container kinds this hook can unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

/// Detects the container kind from the file name, if supported.
fn archive_kind(path: &Path) -> Option<ArchiveKind> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".zip") {
        Some(ArchiveKind::Zip)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Some(ArchiveKind::TarGz)
    } else if name.ends_with(".tar") {
        Some(ArchiveKind::Tar)
    } else {
        None
    }
}

/// Whether the extraction hook knows how to unpack this file.
pub fn is_supported_archive(path: &Path) -> bool {
    archive_kind(path).is_some()
}

/// Extracts a supported archive into a sibling folder named after its stem.
///
/// Returns `Ok(Some(dir))` with the extraction directory on success and
/// `Ok(None)` when the file is not a container this hook handles (e.g.
/// `.rar`, `.7z`, or a bare `.gz`), which the caller should skip silently.
pub fn extract_archive(archive: &Path) -> Result<Option<PathBuf>, ExtractError> {
    let Some(kind) = archive_kind(archive) else {
        return Ok(None);
    };

    // Folder named after the archive, final extension stripped.
    let extract_dir = archive.with_extension("");
    fs::create_dir_all(&extract_dir).map_err(|e| ExtractError::Io {
        path: extract_dir.clone(),
        source: e,
    })?;

    let file = File::open(archive).map_err(|e| ExtractError::Io {
        path: archive.to_path_buf(),
        source: e,
    })?;

    match kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| ExtractError::Zip {
                path: archive.to_path_buf(),
                source: e,
            })?;
            zip.extract(&extract_dir).map_err(|e| ExtractError::Zip {
                path: archive.to_path_buf(),
                source: e,
            })?;
        }
        ArchiveKind::Tar => {
            tar::Archive::new(file)
                .unpack(&extract_dir)
                .map_err(|e| ExtractError::Tar {
                    path: archive.to_path_buf(),
                    source: e,
                })?;
        }
        ArchiveKind::TarGz => {
            tar::Archive::new(GzDecoder::new(file))
                .unpack(&extract_dir)
                .map_err(|e| ExtractError::Tar {
                    path: archive.to_path_buf(),
                    source: e,
                })?;
        }
    }

    Ok(Some(extract_dir))
}
