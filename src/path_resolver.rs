/// Collision-free destination resolution.
///
/// Given a desired destination path, produce a path that does not exist yet
/// by inserting `_1`, `_2`, … between the file stem and its extension. The
/// result depends on live filesystem state, so callers must resolve
/// immediately before moving and never cache the answer.
use std::path::{Path, PathBuf};

/// Upper bound on numbered candidates tried for a single destination.
const MAX_CANDIDATES: u32 = 10_000;

/// No free candidate was found within [`MAX_CANDIDATES`] attempts.
#[derive(Debug)]
pub struct CollisionExhausted {
    /// The desired destination that could not be resolved.
    pub path: PathBuf,
}

impl std::fmt::Display for CollisionExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no free destination for {} within {} candidates",
            self.path.display(),
            MAX_CANDIDATES
        )
    }
}

impl std::error::Error for CollisionExhausted {}

/// Returns `desired` unchanged if nothing exists there, otherwise the first
/// free `stem_N.ext` candidate in increasing order of `N`.
///
/// # Examples
///
/// ```no_run
/// use desksort::path_resolver::resolve_destination;
/// use std::path::Path;
///
/// let path = resolve_destination(Path::new("/downloads/Images/photo.jpg"))?;
/// // "/downloads/Images/photo.jpg", or "photo_1.jpg" if that name is taken.
/// # Ok::<(), desksort::path_resolver::CollisionExhausted>(())
/// ```
pub fn resolve_destination(desired: &Path) -> Result<PathBuf, CollisionExhausted> {
    if !desired.exists() {
        return Ok(desired.to_path_buf());
    }

    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = desired
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = desired.parent().unwrap_or_else(|| Path::new(""));

    for n in 1..=MAX_CANDIDATES {
        let candidate = parent.join(format!("{stem}_{n}{extension}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(CollisionExhausted {
        path: desired.to_path_buf(),
    })
}
