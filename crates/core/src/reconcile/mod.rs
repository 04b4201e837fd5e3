//! Reconciliation of the download tree against the torrent session.
//!
//! [`run_pass`] is the entry point: it validates the root, builds the live
//! set, scans, computes redundant files, deletes them unless in dry-run, and
//! optionally prunes directories left empty. [`reconcile`] is the pure
//! set-difference and deletion step on its own.

mod engine;
mod error;
mod pass;
mod prune;
mod types;

pub use engine::{find_redundant, reconcile};
pub use error::PassError;
pub use pass::{run_pass, PassReport, PassWarning};
pub use prune::prune_empty_dirs;
pub use types::*;
