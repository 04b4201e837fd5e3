//! Removal of directories a sweep leaves empty.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::paths;

use super::types::PruneReport;

/// Remove empty directories below `root`, deepest first.
///
/// `gone` lists paths to treat as already absent (the files this pass deleted,
/// or would delete in dry-run) so that dry-run reports the same directories a
/// real run would remove. `root` itself and anything in `protected` are never
/// removed. Failures are recorded and never stop the walk.
pub fn prune_empty_dirs(
    root: &Path,
    gone: &HashSet<PathBuf>,
    protected: &HashSet<PathBuf>,
    dry_run: bool,
) -> PruneReport {
    let mut report = PruneReport::default();
    let mut emptied: HashSet<PathBuf> = HashSet::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = ?e.path(), error = %e, "Skipping unreadable entry while pruning");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = paths::normalize(entry.path());
        if protected.contains(&dir) {
            continue;
        }

        match is_effectively_empty(&dir, gone, &emptied) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot list directory while pruning");
                report.errors.insert(dir, e.to_string());
                continue;
            }
        }

        if dry_run {
            info!(path = %dir.display(), "Would remove empty directory");
        } else if let Err(e) = std::fs::remove_dir(&dir) {
            warn!(path = %dir.display(), error = %e, "Failed to remove empty directory");
            report.errors.insert(dir, e.to_string());
            continue;
        } else {
            info!(path = %dir.display(), "Removed empty directory");
        }

        emptied.insert(dir.clone());
        report.removed_dirs.push(dir);
    }

    report
}

fn is_effectively_empty(
    dir: &Path,
    gone: &HashSet<PathBuf>,
    emptied: &HashSet<PathBuf>,
) -> io::Result<bool> {
    for child in std::fs::read_dir(dir)? {
        let child = paths::normalize(child?.path());
        if !gone.contains(&child) && !emptied.contains(&child) {
            return Ok(false);
        }
    }
    Ok(true)
}
