//! Types produced by a reconciliation pass.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::ScannedFile;

/// A scanned file that no torrent references.
pub type RedundantFile = ScannedFile;

/// Why a redundant file could not be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteFailureKind {
    /// Gone between scan and delete.
    NotFound,
    PermissionDenied,
    Io,
}

/// A per-file deletion error; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub kind: DeleteFailureKind,
    pub message: String,
}

impl From<&io::Error> for DeleteFailure {
    fn from(e: &io::Error) -> Self {
        let kind = match e.kind() {
            io::ErrorKind::NotFound => DeleteFailureKind::NotFound,
            io::ErrorKind::PermissionDenied => DeleteFailureKind::PermissionDenied,
            _ => DeleteFailureKind::Io,
        };
        Self {
            kind,
            message: e.to_string(),
        }
    }
}

/// Outcome of comparing one scan against one live set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    /// Redundant files in scan discovery order.
    pub redundant_files: Vec<RedundantFile>,
    /// Sum of the scan-time sizes of `redundant_files`.
    pub total_bytes_found: u64,
    pub deleted_count: usize,
    /// Sum of the scan-time sizes of successfully deleted files.
    pub deleted_bytes: u64,
    pub per_file_errors: BTreeMap<PathBuf, DeleteFailure>,
    pub dry_run: bool,
}

impl ReconciliationResult {
    pub fn redundant_count(&self) -> usize {
        self.redundant_files.len()
    }

    pub fn error_count(&self) -> usize {
        self.per_file_errors.len()
    }

    /// Paths that are no longer on disk because of this pass, or that would
    /// not be in dry-run.
    pub fn gone_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.redundant_files
            .iter()
            .map(|f| &f.path)
            .filter(|path| !self.per_file_errors.contains_key(*path))
    }
}

/// Directories removed (or, in dry-run, that would be removed) after a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Deepest first.
    pub removed_dirs: Vec<PathBuf>,
    pub errors: BTreeMap<PathBuf, String>,
}
