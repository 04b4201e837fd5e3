//! Testing utilities and mock implementations.
//!
//! Lets the reconciliation pass run against an in-memory torrent session
//! instead of a real daemon.
//!
//! # Example
//!
//! ```rust,ignore
//! use sweeper_core::testing::MockTorrentClient;
//!
//! let client = MockTorrentClient::new();
//! client.add_torrent(Torrent::new("1", "Album", "/dl"), &["Album/01.flac"]).await;
//! ```

mod mock_torrent_client;

pub use mock_torrent_client::MockTorrentClient;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Write `size` bytes to `root/relative`, creating parent directories.
    pub fn write_file(root: &Path, relative: &str, size: usize) -> std::io::Result<PathBuf> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, vec![b'x'; size])?;
        Ok(path)
    }
}
