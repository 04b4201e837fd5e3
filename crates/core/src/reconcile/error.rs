//! Errors that abort a pass.

use thiserror::Error;

use crate::scanner::ScanError;
use crate::torrent_client::TorrentClientError;

/// A pass-fatal error. Nothing has been deleted when one is returned.
#[derive(Debug, Error)]
pub enum PassError {
    /// The sweep root is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ScanError),

    /// The torrent list could not be fetched; reconciling against a partial
    /// session would delete live data.
    #[error("Cannot list torrents: {0}")]
    Connectivity(#[source] TorrentClientError),
}
