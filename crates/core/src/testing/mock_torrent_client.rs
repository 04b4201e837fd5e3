//! Mock torrent client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::torrent_client::{
    SessionInfo, Torrent, TorrentClient, TorrentClientError, TorrentFile, TorrentId,
};

/// Internal state for a mock torrent.
#[derive(Debug, Clone)]
struct MockTorrent {
    torrent: Torrent,
    files: Vec<TorrentFile>,
}

/// Mock implementation of the TorrentClient trait.
///
/// Provides controllable behavior for testing:
/// - Pre-populate torrents with their file manifests
/// - Fail the next `list_torrents` call (connectivity loss)
/// - Fail `list_files` for specific torrents (partial metadata)
/// - Count calls for ordering assertions
///
/// # Example
///
/// ```rust,ignore
/// let client = MockTorrentClient::new();
/// client.add_torrent(Torrent::new("1", "Movie", "/dl"), &["Movie/movie.mkv"]).await;
/// client.fail_files_for("1", TorrentClientError::Timeout).await;
///
/// let report = run_pass(&SweepConfig::new("/dl"), &client).await?;
/// assert_eq!(report.skipped_torrents.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockTorrentClient {
    /// Torrents in insertion order.
    torrents: Arc<RwLock<Vec<MockTorrent>>>,
    /// If set, the next `list_torrents` will fail with this error.
    next_list_error: Arc<RwLock<Option<TorrentClientError>>>,
    /// Persistent per-torrent `list_files` failures.
    file_errors: Arc<RwLock<HashMap<TorrentId, TorrentClientError>>>,
    /// Total number of trait calls made.
    calls: Arc<RwLock<usize>>,
    version: String,
}

impl Default for MockTorrentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTorrentClient {
    /// Create a new mock torrent client with an empty session.
    pub fn new() -> Self {
        Self {
            torrents: Arc::new(RwLock::new(Vec::new())),
            next_list_error: Arc::new(RwLock::new(None)),
            file_errors: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(0)),
            version: "mock-1.0".to_string(),
        }
    }

    /// Add a torrent with its manifest (names relative to its download dir).
    pub async fn add_torrent(&self, torrent: Torrent, files: &[&str]) {
        self.torrents.write().await.push(MockTorrent {
            torrent,
            files: files.iter().map(|name| TorrentFile::new(*name)).collect(),
        });
    }

    /// Configure the next `list_torrents` call to fail with the given error.
    pub async fn set_next_list_error(&self, error: TorrentClientError) {
        *self.next_list_error.write().await = Some(error);
    }

    /// Make every `list_files` call for `id` fail with the given error.
    pub async fn fail_files_for(&self, id: impl Into<String>, error: TorrentClientError) {
        self.file_errors
            .write()
            .await
            .insert(TorrentId::new(id), error);
    }

    /// Number of trait calls made so far.
    pub async fn call_count(&self) -> usize {
        *self.calls.read().await
    }

    /// Get the number of torrents.
    pub async fn torrent_count(&self) -> usize {
        self.torrents.read().await.len()
    }

    async fn record_call(&self) {
        *self.calls.write().await += 1;
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError> {
        self.record_call().await;
        if let Some(err) = self.next_list_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .torrents
            .read()
            .await
            .iter()
            .map(|t| t.torrent.clone())
            .collect())
    }

    async fn list_files(&self, id: &TorrentId) -> Result<Vec<TorrentFile>, TorrentClientError> {
        self.record_call().await;
        if let Some(err) = self.file_errors.read().await.get(id) {
            return Err(err.clone());
        }

        self.torrents
            .read()
            .await
            .iter()
            .find(|t| &t.torrent.id == id)
            .map(|t| t.files.clone())
            .ok_or_else(|| TorrentClientError::TorrentNotFound(id.to_string()))
    }

    async fn session_info(&self) -> Result<SessionInfo, TorrentClientError> {
        self.record_call().await;
        Ok(SessionInfo {
            backend: self.name().to_string(),
            version: self.version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_torrents_preserves_insertion_order() {
        let client = MockTorrentClient::new();
        client.add_torrent(Torrent::new("b", "B", "/dl"), &[]).await;
        client.add_torrent(Torrent::new("a", "A", "/dl"), &[]).await;

        let torrents = client.list_torrents().await.unwrap();
        let names: Vec<_> = torrents.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(client.torrent_count().await, 2);
    }

    #[tokio::test]
    async fn test_next_list_error_is_taken_once() {
        let client = MockTorrentClient::new();
        client
            .set_next_list_error(TorrentClientError::ConnectionFailed("refused".into()))
            .await;

        assert!(client.list_torrents().await.is_err());
        assert!(client.list_torrents().await.is_ok());
        assert_eq!(client.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_list_files_unknown_torrent() {
        let client = MockTorrentClient::new();
        let result = client.list_files(&TorrentId::new("missing")).await;
        assert!(matches!(result, Err(TorrentClientError::TorrentNotFound(_))));
    }

    #[tokio::test]
    async fn test_file_errors_persist() {
        let client = MockTorrentClient::new();
        client.add_torrent(Torrent::new("1", "T", "/dl"), &["f"]).await;
        client.fail_files_for("1", TorrentClientError::Timeout).await;

        let id = TorrentId::new("1");
        assert!(client.list_files(&id).await.is_err());
        assert!(client.list_files(&id).await.is_err());
    }
}
