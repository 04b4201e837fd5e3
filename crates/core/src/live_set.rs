//! Live file set construction from a torrent client session.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::paths;
use crate::torrent_client::{Torrent, TorrentClient, TorrentId};

/// Normalized absolute paths referenced by at least one torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveFileSet {
    paths: HashSet<PathBuf>,
}

impl LiveFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-normalized path. Returns false on a duplicate.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }
}

impl<P: AsRef<Path>> FromIterator<P> for LiveFileSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(paths::normalize).collect(),
        }
    }
}

/// A torrent whose manifest could not be fetched.
///
/// None of its files are in the live set, so they will be reported as
/// redundant (and deleted outside dry-run) if they sit under the sweep root.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTorrent {
    pub id: TorrentId,
    pub name: String,
    pub error: String,
}

/// Output of [`build_live_set`].
#[derive(Debug, Clone, Default)]
pub struct LiveSetBuild {
    pub live: LiveFileSet,
    /// Normalized download directories of every listed torrent.
    pub download_dirs: HashSet<PathBuf>,
    pub skipped: Vec<SkippedTorrent>,
}

impl LiveSetBuild {
    /// Directories that empty directory pruning must keep: every download
    /// directory plus every ancestor of a live path, so folders a client
    /// created for files it has not written yet survive.
    pub fn protected_dirs(&self) -> HashSet<PathBuf> {
        let mut dirs = self.download_dirs.clone();
        for path in self.live.iter() {
            dirs.extend(path.ancestors().skip(1).map(Path::to_path_buf));
        }
        dirs
    }
}

/// Fetch every torrent's manifest and collect the paths it references.
///
/// A manifest failure skips only that torrent; the build itself never fails.
pub async fn build_live_set(torrents: &[Torrent], client: &dyn TorrentClient) -> LiveSetBuild {
    let mut build = LiveSetBuild::default();

    for torrent in torrents {
        build
            .download_dirs
            .insert(paths::normalize(&torrent.download_dir));

        let files = match client.list_files(&torrent.id).await {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    torrent_id = %torrent.id,
                    torrent = %torrent.name,
                    error = %e,
                    "Failed to list torrent files, its files are not protected this pass"
                );
                build.skipped.push(SkippedTorrent {
                    id: torrent.id.clone(),
                    name: torrent.name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        debug!(
            torrent_id = %torrent.id,
            files = files.len(),
            "Collected torrent manifest"
        );
        for file in files {
            build
                .live
                .insert(paths::resolve(&torrent.download_dir, &file.name));
        }
    }

    build
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTorrentClient;
    use crate::torrent_client::TorrentClientError;

    #[tokio::test]
    async fn test_build_joins_and_normalizes() {
        let client = MockTorrentClient::new();
        client
            .add_torrent(
                Torrent::new("1", "Movie", "/data/dl/"),
                &["Movie/./movie.mkv", "Movie/subs/../subs/en.srt"],
            )
            .await;

        let torrents = client.list_torrents().await.unwrap();
        let build = build_live_set(&torrents, &client).await;

        assert_eq!(build.live.len(), 2);
        assert!(build.live.contains(Path::new("/data/dl/Movie/movie.mkv")));
        assert!(build.live.contains(Path::new("/data/dl/Movie/subs/en.srt")));
        assert!(build.download_dirs.contains(Path::new("/data/dl")));
        assert!(build.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_paths_collapse() {
        let client = MockTorrentClient::new();
        client
            .add_torrent(Torrent::new("1", "A", "/dl"), &["shared.iso"])
            .await;
        client
            .add_torrent(Torrent::new("2", "B", "/dl/"), &["./shared.iso"])
            .await;

        let torrents = client.list_torrents().await.unwrap();
        let build = build_live_set(&torrents, &client).await;
        assert_eq!(build.live.len(), 1);
    }

    #[tokio::test]
    async fn test_manifest_failure_skips_only_that_torrent() {
        let client = MockTorrentClient::new();
        client
            .add_torrent(Torrent::new("1", "Good", "/dl"), &["good.mkv"])
            .await;
        client
            .add_torrent(Torrent::new("2", "Broken", "/dl"), &["broken.mkv"])
            .await;
        client
            .fail_files_for(
                "2",
                TorrentClientError::TorrentNotFound("2".to_string()),
            )
            .await;

        let torrents = client.list_torrents().await.unwrap();
        let build = build_live_set(&torrents, &client).await;

        assert!(build.live.contains(Path::new("/dl/good.mkv")));
        assert!(!build.live.contains(Path::new("/dl/broken.mkv")));
        assert_eq!(build.skipped.len(), 1);
        assert_eq!(build.skipped[0].name, "Broken");
        assert!(build.skipped[0].error.contains("not found"));
    }

    #[tokio::test]
    async fn test_no_torrents_yields_empty_set() {
        let client = MockTorrentClient::new();
        let build = build_live_set(&[], &client).await;
        assert!(build.live.is_empty());
        assert!(build.download_dirs.is_empty());
    }

    #[tokio::test]
    async fn test_protected_dirs_cover_live_ancestors() {
        let client = MockTorrentClient::new();
        client
            .add_torrent(Torrent::new("1", "Show", "/dl/tv"), &["Show/S01/e01.mkv"])
            .await;

        let torrents = client.list_torrents().await.unwrap();
        let protected = build_live_set(&torrents, &client).await.protected_dirs();

        assert!(protected.contains(Path::new("/dl/tv")));
        assert!(protected.contains(Path::new("/dl/tv/Show")));
        assert!(protected.contains(Path::new("/dl/tv/Show/S01")));
        assert!(!protected.contains(Path::new("/dl/tv/Show/S01/e01.mkv")));
    }

    #[test]
    fn test_from_iterator_normalizes() {
        let live: LiveFileSet = ["/a/./b", "/a//c/"].into_iter().collect();
        assert!(live.contains(Path::new("/a/b")));
        assert!(live.contains(Path::new("/a/c")));
    }
}
