//! Set difference and the deletion pass.

use tokio::fs;
use tracing::{debug, info, warn};

use crate::live_set::LiveFileSet;
use crate::scanner::ScannedFile;

use super::types::{DeleteFailure, ReconciliationResult, RedundantFile};

/// Scanned files whose path is not in `live`, in scan order.
pub fn find_redundant(
    scanned: impl IntoIterator<Item = ScannedFile>,
    live: &LiveFileSet,
) -> Vec<RedundantFile> {
    scanned
        .into_iter()
        .filter(|file| !live.contains(&file.path))
        .collect()
}

/// Compute redundant files and, unless `dry_run`, delete them one by one.
///
/// Each deletion is independent: a failure is recorded in
/// `per_file_errors` and the batch carries on. Sizes come from the scan, so
/// a file that vanished in the meantime counts as an error, not as freed
/// space.
pub async fn reconcile(
    scanned: impl IntoIterator<Item = ScannedFile>,
    live: &LiveFileSet,
    dry_run: bool,
) -> ReconciliationResult {
    let redundant_files = find_redundant(scanned, live);
    let total_bytes_found = redundant_files.iter().map(|f| f.size_bytes).sum();

    let mut result = ReconciliationResult {
        redundant_files,
        total_bytes_found,
        dry_run,
        ..Default::default()
    };

    if dry_run {
        for file in &result.redundant_files {
            info!(path = %file.path.display(), bytes = file.size_bytes, "Would delete redundant file");
        }
        return result;
    }

    for file in &result.redundant_files {
        match fs::remove_file(&file.path).await {
            Ok(()) => {
                result.deleted_count += 1;
                result.deleted_bytes += file.size_bytes;
                info!(path = %file.path.display(), bytes = file.size_bytes, "Deleted redundant file");
            }
            Err(e) => {
                warn!(path = %file.path.display(), error = %e, "Failed to delete redundant file");
                result
                    .per_file_errors
                    .insert(file.path.clone(), DeleteFailure::from(&e));
            }
        }
    }

    debug!(
        deleted = result.deleted_count,
        errors = result.per_file_errors.len(),
        "Deletion pass finished"
    );
    result
}
