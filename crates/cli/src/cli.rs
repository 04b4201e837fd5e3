use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sweeper",
    about = "Find and remove download files no torrent references anymore",
    version
)]
pub struct Cli {
    /// Configuration file
    #[arg(long, short, env = "SWEEPER_CONFIG", default_value = "sweeper.toml")]
    pub config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a single reconciliation pass
    Run {
        #[command(flatten)]
        mode: ModeArgs,

        /// Print the pass summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Run a pass now and then on the configured interval until interrupted
    Daemon {
        #[command(flatten)]
        mode: ModeArgs,
    },

    /// Check that the torrent client is reachable
    Check,

    /// Print the effective configuration with secrets redacted
    Config,
}

/// Overrides for `sweep.dry_run`.
#[derive(Args, Clone, Copy, Default)]
pub struct ModeArgs {
    /// Actually delete redundant files
    #[arg(long, conflicts_with = "dry_run")]
    pub delete: bool,

    /// Only report, even if the configuration disables dry-run
    #[arg(long)]
    pub dry_run: bool,
}

impl ModeArgs {
    /// Resolve the effective dry-run flag against the configured default.
    pub fn dry_run(self, configured: bool) -> bool {
        if self.delete {
            false
        } else if self.dry_run {
            true
        } else {
            configured
        }
    }
}
