//! Human-readable sizes and pass summaries.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::reconcile::{PassReport, PassWarning};

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Render a byte count with 1024-based units and two decimals.
///
/// Values beyond the largest unit stay in PB.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Digest of a pass for logs and `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub pass_id: Uuid,
    pub dry_run: bool,
    pub root: PathBuf,
    pub torrents: usize,
    pub skipped_torrents: usize,
    pub scanned_files: usize,
    pub redundant_files: usize,
    pub redundant_bytes: u64,
    pub redundant_size: String,
    pub deleted_files: usize,
    pub deleted_bytes: u64,
    pub deleted_size: String,
    pub delete_errors: usize,
    pub removed_dirs: usize,
    pub dir_errors: usize,
    pub warnings: Vec<PassWarning>,
    pub duration_ms: i64,
}

impl From<&PassReport> for PassSummary {
    fn from(report: &PassReport) -> Self {
        let result = &report.result;
        let (removed_dirs, dir_errors) = report
            .pruned
            .as_ref()
            .map(|p| (p.removed_dirs.len(), p.errors.len()))
            .unwrap_or((0, 0));

        Self {
            pass_id: report.pass_id,
            dry_run: result.dry_run,
            root: report.root.clone(),
            torrents: report.torrent_count,
            skipped_torrents: report.skipped_torrents.len(),
            scanned_files: report.scanned_file_count,
            redundant_files: result.redundant_count(),
            redundant_bytes: result.total_bytes_found,
            redundant_size: format_size(result.total_bytes_found),
            deleted_files: result.deleted_count,
            deleted_bytes: result.deleted_bytes,
            deleted_size: format_size(result.deleted_bytes),
            delete_errors: result.error_count(),
            removed_dirs,
            dir_errors,
            warnings: report.warnings.clone(),
            duration_ms: (report.finished_at - report.started_at).num_milliseconds(),
        }
    }
}

/// Log the outcome of a pass: one summary line plus one line per warning.
pub fn log_report(report: &PassReport) {
    let summary = PassSummary::from(report);

    if summary.redundant_files == 0 {
        info!(scanned_files = summary.scanned_files, "No redundant files found");
    } else {
        info!(
            "Found {} redundant files, total size: {}",
            summary.redundant_files, summary.redundant_size
        );
    }

    if summary.dry_run {
        info!("Dry run: no files were deleted");
    } else {
        info!(
            "Deleted {} files, freed {} ({} errors)",
            summary.deleted_files, summary.deleted_size, summary.delete_errors
        );
    }

    if summary.removed_dirs > 0 || summary.dir_errors > 0 {
        let verb = if summary.dry_run { "Would remove" } else { "Removed" };
        info!(
            "{} {} empty directories ({} errors)",
            verb, summary.removed_dirs, summary.dir_errors
        );
    }

    for warning in &summary.warnings {
        match warning {
            PassWarning::NoTorrents { scanned_files } => warn!(
                "The torrent client reported no files: all {} scanned files were treated as redundant. Check the client connection and download directory.",
                scanned_files
            ),
            PassWarning::SkippedTorrents { count } => warn!(
                "{} torrents could not list their files; their files were treated as redundant",
                count
            ),
            PassWarning::UnreadableEntries { count } => {
                warn!("{} entries under the download directory could not be read", count)
            }
        }
    }
    for skipped in &report.skipped_torrents {
        warn!(torrent_id = %skipped.id, torrent = %skipped.name, error = %skipped.error, "Skipped torrent");
    }
}
