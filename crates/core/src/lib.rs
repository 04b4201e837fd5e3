pub mod config;
pub mod live_set;
pub mod paths;
pub mod reconcile;
pub mod report;
pub mod scanner;
pub mod testing;
pub mod torrent_client;

pub use config::{
    load_config, load_config_from_str, validate_config, ClientBackend, ClientConfig, Config,
    ConfigError, QBittorrentConfig, SanitizedConfig, ScheduleConfig, SweepConfig,
    TransmissionConfig,
};
pub use live_set::{build_live_set, LiveFileSet, LiveSetBuild, SkippedTorrent};
pub use paths::normalize;
pub use reconcile::{
    find_redundant, prune_empty_dirs, reconcile, run_pass, DeleteFailure, DeleteFailureKind,
    PassError, PassReport, PassWarning, PruneReport, ReconciliationResult, RedundantFile,
};
pub use report::{format_size, log_report, PassSummary};
pub use scanner::{DirectoryScanner, Scan, ScanError, ScannedFile};
pub use torrent_client::{
    create_torrent_client, QBittorrentClient, SessionInfo, Torrent, TorrentClient,
    TorrentClientError, TorrentFile, TorrentId, TransmissionClient,
};
