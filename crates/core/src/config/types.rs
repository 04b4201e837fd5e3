use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    pub sweep: SweepConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Torrent client connection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: ClientBackend,
    /// Transmission-specific configuration (defaults are used when absent)
    #[serde(default)]
    pub transmission: Option<TransmissionConfig>,
    /// qBittorrent-specific configuration (required when backend = "qbittorrent")
    #[serde(default)]
    pub qbittorrent: Option<QBittorrentConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: ClientBackend::default(),
            transmission: Some(TransmissionConfig::default()),
            qbittorrent: None,
        }
    }
}

/// Available torrent client backends
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientBackend {
    #[default]
    Transmission,
    #[serde(rename = "qbittorrent")]
    QBittorrent,
}

impl ClientBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientBackend::Transmission => "transmission",
            ClientBackend::QBittorrent => "qbittorrent",
        }
    }
}

/// Transmission RPC configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransmissionConfig {
    #[serde(default = "default_transmission_host")]
    pub host: String,
    #[serde(default = "default_transmission_port")]
    pub port: u16,
    /// RPC endpoint path (default: "/transmission/rpc")
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl TransmissionConfig {
    /// Full RPC endpoint URL.
    pub fn rpc_url(&self) -> String {
        let path = self.rpc_path.trim_start_matches('/');
        format!("http://{}:{}/{}", self.host, self.port, path)
    }
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            host: default_transmission_host(),
            port: default_transmission_port(),
            rpc_path: default_rpc_path(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_transmission_host() -> String {
    "localhost".to_string()
}

fn default_transmission_port() -> u16 {
    9091
}

fn default_rpc_path() -> String {
    "/transmission/rpc".to_string()
}

/// qBittorrent WebUI configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// WebUI URL (e.g., "http://localhost:8080")
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// What to sweep and how
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Root of the download tree to reconcile.
    pub download_dir: PathBuf,
    /// Report only; never touch the filesystem.
    #[serde(default = "default_true")]
    pub dry_run: bool,
    /// Remove directories left empty after the sweep.
    #[serde(default = "default_true")]
    pub delete_empty_dirs: bool,
}

impl SweepConfig {
    /// Dry-run sweep of `download_dir` with empty directory pruning.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            dry_run: true,
            delete_empty_dirs: true,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_delete_empty_dirs(mut self, delete_empty_dirs: bool) -> Self {
        self.delete_empty_dirs = delete_empty_dirs;
        self
    }
}

fn default_true() -> bool {
    true
}

/// Recurring pass schedule used by `sweeper daemon`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Seconds between passes (default: one day)
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    86_400
}

/// Sanitized config for display (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub client: SanitizedClientConfig,
    pub sweep: SweepConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedClientConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<SanitizedTransmissionConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbittorrent: Option<SanitizedQBittorrentConfig>,
}

/// Sanitized Transmission config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTransmissionConfig {
    pub rpc_url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            client: SanitizedClientConfig {
                backend: config.client.backend.as_str().to_string(),
                transmission: config.client.transmission.as_ref().map(|t| {
                    SanitizedTransmissionConfig {
                        rpc_url: t.rpc_url(),
                        username: t.username.clone(),
                        password_configured: !t.password.is_empty(),
                        timeout_secs: t.timeout_secs,
                    }
                }),
                qbittorrent: config.client.qbittorrent.as_ref().map(|q| {
                    SanitizedQBittorrentConfig {
                        url: q.url.clone(),
                        username: q.username.clone(),
                        password_configured: !q.password.is_empty(),
                        timeout_secs: q.timeout_secs,
                    }
                }),
            },
            sweep: config.sweep.clone(),
            schedule: config.schedule.clone(),
        }
    }
}
