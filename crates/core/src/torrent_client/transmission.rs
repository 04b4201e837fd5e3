//! Transmission RPC client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::TransmissionConfig;

use super::{SessionInfo, Torrent, TorrentClient, TorrentClientError, TorrentFile, TorrentId};

/// CSRF token header; the daemon answers 409 until it is echoed back.
const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Transmission client implementation.
pub struct TransmissionClient {
    client: Client,
    config: TransmissionConfig,
    rpc_url: String,
    /// Session id from the last 409 handshake.
    session_id: RwLock<Option<String>>,
}

impl TransmissionClient {
    /// Create a new Transmission client.
    pub fn new(config: TransmissionConfig) -> Result<Self, TorrentClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| {
                TorrentClientError::Internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            rpc_url: config.rpc_url(),
            config,
            session_id: RwLock::new(None),
        })
    }

    /// Send one RPC request with the current session id and credentials.
    async fn send(&self, request: &RpcRequest<'_>) -> Result<Response, TorrentClientError> {
        let mut builder = self.client.post(&self.rpc_url).json(request);

        let session_id = self.session_id.read().await.clone();
        if let Some(id) = session_id {
            builder = builder.header(SESSION_ID_HEADER, id);
        }
        if !self.config.username.is_empty() {
            builder = builder.basic_auth(&self.config.username, Some(&self.config.password));
        }

        builder.send().await.map_err(TorrentClientError::from_transport)
    }

    /// Invoke an RPC method, performing the session id handshake if needed.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        arguments: Value,
    ) -> Result<T, TorrentClientError> {
        let request = RpcRequest { method, arguments };

        let mut response = self.send(&request).await?;
        if response.status() == StatusCode::CONFLICT {
            let session_id = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    TorrentClientError::ApiError(
                        "HTTP 409 without a session id header".to_string(),
                    )
                })?;
            debug!("Transmission session id refreshed");
            *self.session_id.write().await = Some(session_id);

            response = self.send(&request).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TorrentClientError::AuthenticationFailed(format!(
                "HTTP {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(TorrentClientError::from_transport)?;
        parse_response(&body)
    }
}

/// RPC request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    arguments: Value,
}

/// RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct TorrentGetArguments<T> {
    torrents: Vec<T>,
}

/// `torrent-get` entry requested with the id/name/downloadDir fields.
#[derive(Debug, Deserialize)]
struct RpcTorrent {
    id: i64,
    name: String,
    #[serde(rename = "downloadDir")]
    download_dir: String,
}

impl RpcTorrent {
    fn into_torrent(self) -> Torrent {
        Torrent {
            id: TorrentId::from(self.id),
            name: self.name,
            download_dir: self.download_dir.into(),
        }
    }
}

/// `torrent-get` entry requested with the files field.
#[derive(Debug, Deserialize)]
struct RpcTorrentFiles {
    files: Vec<RpcFile>,
}

#[derive(Debug, Deserialize)]
struct RpcFile {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RpcSession {
    version: String,
}

/// Decode an RPC response body, surfacing non-"success" results as errors.
fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, TorrentClientError> {
    let response: RpcResponse = serde_json::from_str(body)
        .map_err(|e| TorrentClientError::ApiError(format!("Failed to parse response: {}", e)))?;

    if response.result != "success" {
        return Err(TorrentClientError::ApiError(response.result));
    }

    serde_json::from_value(response.arguments)
        .map_err(|e| TorrentClientError::ApiError(format!("Unexpected arguments: {}", e)))
}

/// Transmission accepts numeric session ids as well as hash strings.
fn rpc_id(id: &TorrentId) -> Value {
    match id.as_str().parse::<i64>() {
        Ok(numeric) => json!(numeric),
        Err(_) => json!(id.as_str()),
    }
}

#[async_trait]
impl TorrentClient for TransmissionClient {
    fn name(&self) -> &str {
        "transmission"
    }

    async fn list_torrents(&self) -> Result<Vec<Torrent>, TorrentClientError> {
        let arguments: TorrentGetArguments<RpcTorrent> = self
            .call(
                "torrent-get",
                json!({ "fields": ["id", "name", "downloadDir"] }),
            )
            .await?;

        Ok(arguments
            .torrents
            .into_iter()
            .map(RpcTorrent::into_torrent)
            .collect())
    }

    async fn list_files(&self, id: &TorrentId) -> Result<Vec<TorrentFile>, TorrentClientError> {
        let arguments: TorrentGetArguments<RpcTorrentFiles> = self
            .call(
                "torrent-get",
                json!({ "ids": [rpc_id(id)], "fields": ["id", "files"] }),
            )
            .await?;

        arguments
            .torrents
            .into_iter()
            .next()
            .map(|t| t.files.into_iter().map(|f| TorrentFile::new(f.name)).collect())
            .ok_or_else(|| TorrentClientError::TorrentNotFound(id.to_string()))
    }

    async fn session_info(&self) -> Result<SessionInfo, TorrentClientError> {
        let session: RpcSession = self
            .call("session-get", json!({ "fields": ["version"] }))
            .await?;

        Ok(SessionInfo {
            backend: self.name().to_string(),
            version: session.version,
        })
    }
}
