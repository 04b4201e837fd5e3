//! One full reconciliation pass.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::SweepConfig;
use crate::live_set::{build_live_set, SkippedTorrent};
use crate::scanner::DirectoryScanner;
use crate::torrent_client::TorrentClient;

use super::engine::reconcile;
use super::error::PassError;
use super::prune::prune_empty_dirs;
use super::types::{PruneReport, ReconciliationResult};

/// Non-fatal conditions worth surfacing next to the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassWarning {
    /// The client returned no torrents, so every scanned file is redundant.
    /// Usually a misconfigured client or download root.
    NoTorrents { scanned_files: usize },
    /// Torrents whose manifests failed to load; their files were not
    /// protected this pass.
    SkippedTorrents { count: usize },
    /// Entries under the root that could not be read during the scan.
    UnreadableEntries { count: usize },
}

/// Everything one pass observed and did.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub pass_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Normalized sweep root.
    pub root: PathBuf,
    /// Backend name of the torrent client.
    pub client: String,
    pub torrent_count: usize,
    pub live_file_count: usize,
    pub scanned_file_count: usize,
    pub skipped_torrents: Vec<SkippedTorrent>,
    pub warnings: Vec<PassWarning>,
    pub result: ReconciliationResult,
    /// Present when empty directory pruning is enabled.
    pub pruned: Option<PruneReport>,
}

impl PassReport {
    /// True when the zero-torrent safety warning fired.
    pub fn has_no_torrents_warning(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, PassWarning::NoTorrents { .. }))
    }
}

/// Run one pass: validate the root, build the live set, scan, reconcile and
/// optionally prune empty directories.
///
/// The root is checked before the client is contacted, and the torrent list
/// must load completely before anything is compared or deleted.
pub async fn run_pass(
    config: &SweepConfig,
    client: &dyn TorrentClient,
) -> Result<PassReport, PassError> {
    let pass_id = Uuid::new_v4();
    let span = info_span!("pass", %pass_id, dry_run = config.dry_run);
    execute(pass_id, config, client).instrument(span).await
}

async fn execute(
    pass_id: Uuid,
    config: &SweepConfig,
    client: &dyn TorrentClient,
) -> Result<PassReport, PassError> {
    let started_at = Utc::now();
    let scanner = DirectoryScanner::new(&config.download_dir)?;
    info!(root = %scanner.root().display(), client = client.name(), "Starting pass");

    let torrents = client
        .list_torrents()
        .await
        .map_err(PassError::Connectivity)?;
    info!(torrents = torrents.len(), "Listed torrents");

    let build = build_live_set(&torrents, client).await;
    info!(
        live_files = build.live.len(),
        skipped_torrents = build.skipped.len(),
        "Built live file set"
    );

    let mut scan = scanner.scan();
    let scanned: Vec<_> = scan.by_ref().collect();
    let scanned_file_count = scanned.len();
    info!(scanned_files = scanned_file_count, "Scanned download directory");

    let mut warnings = Vec::new();
    if build.live.is_empty() && scanned_file_count > 0 {
        warn!(
            scanned_files = scanned_file_count,
            "Torrent client references no files; every scanned file is redundant"
        );
        warnings.push(PassWarning::NoTorrents {
            scanned_files: scanned_file_count,
        });
    }
    if !build.skipped.is_empty() {
        warnings.push(PassWarning::SkippedTorrents {
            count: build.skipped.len(),
        });
    }
    if scan.skipped() > 0 {
        warnings.push(PassWarning::UnreadableEntries {
            count: scan.skipped(),
        });
    }

    let result = reconcile(scanned, &build.live, config.dry_run).await;

    let pruned = if config.delete_empty_dirs {
        let gone: HashSet<PathBuf> = result.gone_paths().cloned().collect();
        Some(prune_empty_dirs(
            scanner.root(),
            &gone,
            &build.protected_dirs(),
            config.dry_run,
        ))
    } else {
        None
    };

    Ok(PassReport {
        pass_id,
        started_at,
        finished_at: Utc::now(),
        root: scanner.root().to_path_buf(),
        client: client.name().to_string(),
        torrent_count: torrents.len(),
        live_file_count: build.live.len(),
        scanned_file_count,
        skipped_torrents: build.skipped,
        warnings,
        result,
        pruned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::write_file;
    use crate::testing::MockTorrentClient;
    use crate::torrent_client::{Torrent, TorrentClientError};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_root_fails_before_client_call() {
        let temp = TempDir::new().unwrap();
        let client = MockTorrentClient::new();
        let config = SweepConfig::new(temp.path().join("missing"));

        let err = run_pass(&config, &client).await.unwrap_err();
        assert!(matches!(err, PassError::Configuration(_)));
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_connectivity_failure_aborts_without_deleting() {
        let temp = TempDir::new().unwrap();
        let file = write_file(temp.path(), "a.mkv", 4).unwrap();
        let client = MockTorrentClient::new();
        client
            .set_next_list_error(TorrentClientError::AuthenticationFailed("401".into()))
            .await;

        let config = SweepConfig::new(temp.path()).with_dry_run(false);
        let err = run_pass(&config, &client).await.unwrap_err();

        assert!(matches!(err, PassError::Connectivity(_)));
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_skipped_torrent_files_become_redundant_with_warning() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "ok.mkv", 1).unwrap();
        write_file(temp.path(), "flaky.mkv", 2).unwrap();

        let client = MockTorrentClient::new();
        client
            .add_torrent(Torrent::new("1", "ok", temp.path()), &["ok.mkv"])
            .await;
        client
            .add_torrent(Torrent::new("2", "flaky", temp.path()), &["flaky.mkv"])
            .await;
        client.fail_files_for("2", TorrentClientError::Timeout).await;

        let report = run_pass(&SweepConfig::new(temp.path()), &client)
            .await
            .unwrap();

        assert_eq!(report.result.redundant_count(), 1);
        assert!(report.result.redundant_files[0].path.ends_with("flaky.mkv"));
        assert_eq!(report.skipped_torrents.len(), 1);
        assert!(report
            .warnings
            .contains(&PassWarning::SkippedTorrents { count: 1 }));
        assert!(!report.has_no_torrents_warning());
    }

    #[tokio::test]
    async fn test_prune_runs_only_when_enabled() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("leftover")).unwrap();
        let client = MockTorrentClient::new();

        let disabled = SweepConfig::new(temp.path()).with_delete_empty_dirs(false);
        let report = run_pass(&disabled, &client).await.unwrap();
        assert!(report.pruned.is_none());

        let enabled = SweepConfig::new(temp.path()).with_dry_run(false);
        let report = run_pass(&enabled, &client).await.unwrap();
        assert_eq!(report.pruned.unwrap().removed_dirs.len(), 1);
        assert!(!temp.path().join("leftover").exists());
    }

    #[tokio::test]
    async fn test_prune_keeps_dirs_of_files_not_yet_written() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("Show/S01")).unwrap();
        std::fs::create_dir_all(temp.path().join("stale")).unwrap();

        let client = MockTorrentClient::new();
        client
            .add_torrent(Torrent::new("1", "Show", temp.path()), &["Show/S01/e01.mkv"])
            .await;

        let config = SweepConfig::new(temp.path()).with_dry_run(false);
        let report = run_pass(&config, &client).await.unwrap();

        assert_eq!(report.pruned.unwrap().removed_dirs.len(), 1);
        assert!(temp.path().join("Show/S01").exists());
        assert!(!temp.path().join("stale").exists());
    }

    #[tokio::test]
    async fn test_empty_root_with_no_torrents_is_quiet() {
        let temp = TempDir::new().unwrap();
        let client = MockTorrentClient::new();

        let report = run_pass(&SweepConfig::new(temp.path()), &client)
            .await
            .unwrap();
        assert!(report.warnings.is_empty());
        assert_eq!(report.scanned_file_count, 0);
        assert_eq!(report.client, "mock");
    }
}
