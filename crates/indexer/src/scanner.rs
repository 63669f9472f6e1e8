use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Result of walking the root directories.
pub struct ScanOutcome {
    /// Regular files found, in walk order
    pub files: Vec<PathBuf>,

    /// Entries skipped because they could not be read
    pub skipped: usize,
}

/// Recursively enumerate regular files beneath each root.
///
/// Unreadable entries (permission errors, vanished paths, missing roots) are
/// logged and counted; the walk of sibling entries and remaining roots
/// continues.
pub fn scan_roots(roots: &[impl AsRef<Path>]) -> ScanOutcome {
    let mut files = Vec::new();
    let mut skipped = 0usize;

    for root in roots {
        let root = root.as_ref();
        log::info!("Scanning {}", root.display());
        for entry in WalkDir::new(root) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {}: {e}", root.display());
                    skipped += 1;
                }
            }
        }
    }

    log::info!("Found {} files ({} entries skipped)", files.len(), skipped);
    ScanOutcome { files, skipped }
}
