//! Torrent client abstraction.
//!
//! This module provides a read-only `TorrentClient` trait over the session of
//! a torrent daemon (Transmission, qBittorrent).

mod qbittorrent;
mod transmission;
mod types;

use std::sync::Arc;

pub use qbittorrent::QBittorrentClient;
pub use transmission::TransmissionClient;
pub use types::*;

use crate::config::{ClientBackend, ClientConfig};

/// Create the torrent client selected by the configuration.
pub fn create_torrent_client(
    config: &ClientConfig,
) -> Result<Arc<dyn TorrentClient>, TorrentClientError> {
    match config.backend {
        ClientBackend::Transmission => {
            let transmission = config.transmission.clone().unwrap_or_default();
            Ok(Arc::new(TransmissionClient::new(transmission)?))
        }
        ClientBackend::QBittorrent => {
            let qbit = config.qbittorrent.clone().ok_or_else(|| {
                TorrentClientError::Internal(
                    "qbittorrent backend selected but no qbittorrent config provided".to_string(),
                )
            })?;
            Ok(Arc::new(QBittorrentClient::new(qbit)?))
        }
    }
}
