//! Types for torrent client operations.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Clone, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Torrent not found: {0}")]
    TorrentNotFound(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TorrentClientError {
    /// Maps a transport error onto the client error taxonomy.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TorrentClientError::Timeout
        } else if e.is_connect() {
            TorrentClientError::ConnectionFailed(e.to_string())
        } else {
            TorrentClientError::ApiError(e.to_string())
        }
    }
}

/// Backend-specific torrent identifier.
///
/// Transmission uses numeric session ids, qBittorrent uses info hashes. The
/// sweeper never interprets it beyond handing it back to the same client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorrentId(String);

impl TorrentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TorrentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for TorrentId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// A torrent known to the client session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Torrent {
    pub id: TorrentId,
    pub name: String,
    /// Directory the torrent's file names are relative to.
    pub download_dir: PathBuf,
}

impl Torrent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: TorrentId::new(id),
            name: name.into(),
            download_dir: download_dir.into(),
        }
    }
}

/// One entry of a torrent's file manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Path relative to the owning torrent's download directory.
    pub name: String,
}

impl TorrentFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Identification returned by a connection probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Backend name ("transmission", "qbittorrent", ...).
    pub backend: String,
    /// Daemon version string as reported by the client.
    pub version: String,
}

/// Read-only view of a torrent client session.
///
/// Implementations must bound every call with a timeout; the sweeper treats a
/// failed `list_torrents` as fatal for the pass and a failed `list_files` as
/// affecting only that torrent.
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// List all torrents in the session.
    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError>;

    /// List the file manifest of one torrent.
    async fn list_files(&self, id: &TorrentId) -> Result<Vec<TorrentFile>, TorrentClientError>;

    /// Probe the connection and report the daemon version.
    async fn session_info(&self) -> Result<SessionInfo, TorrentClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torrent_id_display_and_conversion() {
        let id = TorrentId::from(42);
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
        assert_eq!(TorrentId::new("abc123"), TorrentId::new("abc123".to_string()));
    }

    #[test]
    fn test_torrent_id_serializes_transparently() {
        let json = serde_json::to_string(&TorrentId::new("deadbeef")).unwrap();
        assert_eq!(json, "\"deadbeef\"");
    }

    #[test]
    fn test_torrent_serialization() {
        let torrent = Torrent::new("7", "Some.Show.S01", "/data/downloads/tv");
        let json = serde_json::to_string(&torrent).unwrap();
        let parsed: Torrent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, torrent);
        assert_eq!(parsed.download_dir, PathBuf::from("/data/downloads/tv"));
    }
}
