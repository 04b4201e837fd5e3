//! qBittorrent torrent client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;

use super::{SessionInfo, Torrent, TorrentClient, TorrentClientError, TorrentFile, TorrentId};

/// qBittorrent client implementation.
pub struct QBittorrentClient {
    client: Client,
    config: QBittorrentConfig,
    /// Set once the cookie jar holds a valid SID.
    authenticated: RwLock<bool>,
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: QBittorrentConfig) -> Result<Self, TorrentClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| {
                TorrentClientError::Internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            config,
            authenticated: RwLock::new(false),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Login and let the cookie jar keep the session.
    async fn login(&self) -> Result<(), TorrentClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(TorrentClientError::from_transport)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            *self.authenticated.write().await = true;
            Ok(())
        } else if body.contains("Fails.") || status == StatusCode::FORBIDDEN {
            Err(TorrentClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TorrentClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a valid session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), TorrentClientError> {
        if *self.authenticated.read().await {
            return Ok(());
        }
        self.login().await
    }

    /// Make an authenticated GET request, re-authenticating once on 403.
    async fn get(&self, endpoint: &str) -> Result<String, TorrentClientError> {
        self.ensure_authenticated().await?;

        let url = format!("{}{}", self.base_url(), endpoint);
        let mut response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(TorrentClientError::from_transport)?;

        if response.status() == StatusCode::FORBIDDEN {
            warn!("qBittorrent session expired, re-authenticating");
            *self.authenticated.write().await = false;
            self.login().await?;

            response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(TorrentClientError::from_transport)?;
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TorrentClientError::TorrentNotFound(endpoint.to_string()));
        }
        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(TorrentClientError::from_transport)
    }
}

/// qBittorrent torrent info response (only the fields the sweeper reads).
#[derive(Debug, Deserialize)]
struct QBTorrentInfo {
    hash: String,
    name: String,
    save_path: String,
}

impl QBTorrentInfo {
    fn into_torrent(self) -> Torrent {
        Torrent {
            id: TorrentId::new(self.hash.to_lowercase()),
            name: self.name,
            download_dir: self.save_path.into(),
        }
    }
}

/// qBittorrent file manifest entry.
#[derive(Debug, Deserialize)]
struct QBFile {
    name: String,
}

fn parse_torrents(body: &str) -> Result<Vec<Torrent>, TorrentClientError> {
    let torrents: Vec<QBTorrentInfo> = serde_json::from_str(body)
        .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;
    Ok(torrents.into_iter().map(QBTorrentInfo::into_torrent).collect())
}

fn parse_files(body: &str) -> Result<Vec<TorrentFile>, TorrentClientError> {
    let files: Vec<QBFile> = serde_json::from_str(body)
        .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;
    Ok(files.into_iter().map(|f| TorrentFile::new(f.name)).collect())
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError> {
        let response = self.get("/api/v2/torrents/info").await?;
        parse_torrents(&response)
    }

    async fn list_files(&self, id: &TorrentId) -> Result<Vec<TorrentFile>, TorrentClientError> {
        let endpoint = format!(
            "/api/v2/torrents/files?hash={}",
            urlencoding::encode(id.as_str())
        );
        match self.get(&endpoint).await {
            Err(TorrentClientError::TorrentNotFound(_)) => {
                Err(TorrentClientError::TorrentNotFound(id.to_string()))
            }
            Err(e) => Err(e),
            Ok(response) => parse_files(&response),
        }
    }

    async fn session_info(&self) -> Result<SessionInfo, TorrentClientError> {
        let version = self.get("/api/v2/app/version").await?;
        Ok(SessionInfo {
            backend: self.name().to_string(),
            version: version.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_torrents() {
        let body = r#"[
            {"hash": "ABC123", "name": "Test Torrent", "save_path": "/downloads/", "state": "uploading", "progress": 1.0},
            {"hash": "def456", "name": "Other", "save_path": "/downloads/tv", "category": "tv"}
        ]"#;

        let torrents = parse_torrents(body).unwrap();
        assert_eq!(torrents.len(), 2);
        assert_eq!(torrents[0].id.as_str(), "abc123"); // lowercase
        assert_eq!(torrents[0].name, "Test Torrent");
        assert_eq!(torrents[0].download_dir, PathBuf::from("/downloads/"));
        assert_eq!(torrents[1].download_dir, PathBuf::from("/downloads/tv"));
    }

    #[test]
    fn test_parse_files() {
        let body = r#"[
            {"index": 0, "name": "Album/01 - Intro.flac", "size": 1000, "progress": 1},
            {"index": 1, "name": "Album/cover.jpg", "size": 20, "progress": 1}
        ]"#;

        let files = parse_files(body).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "Album/01 - Intro.flac");
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(
            parse_torrents("Forbidden"),
            Err(TorrentClientError::ApiError(_))
        ));
        assert!(matches!(
            parse_files("{\"not\": \"a list\"}"),
            Err(TorrentClientError::ApiError(_))
        ));
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let client = QBittorrentClient::new(QBittorrentConfig {
            url: "http://localhost:8080/".to_string(),
            username: "admin".to_string(),
            password: "adminadmin".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
