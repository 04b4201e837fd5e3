mod cli;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweeper_core::{
    create_torrent_client, load_config, log_report, run_pass, validate_config, Config,
    PassSummary, SanitizedConfig, TorrentClient,
};

use cli::{Cli, Command, ModeArgs};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    validate_config(&config).context("Configuration validation failed")?;

    match cli.command {
        Command::Run { mode, json } => run_once(&config, mode, json).await,
        Command::Daemon { mode } => run_daemon(&config, mode).await,
        Command::Check => check(&config).await,
        Command::Config => {
            let sanitized = SanitizedConfig::from(&config);
            println!("{}", serde_json::to_string_pretty(&sanitized)?);
            Ok(())
        }
    }
}

fn connect(config: &Config) -> Result<std::sync::Arc<dyn TorrentClient>> {
    let client = create_torrent_client(&config.client)
        .context("Failed to create torrent client")?;
    info!("Using torrent client: {}", client.name());
    Ok(client)
}

async fn run_once(config: &Config, mode: ModeArgs, json: bool) -> Result<()> {
    let client = connect(config)?;
    let sweep = config
        .sweep
        .clone()
        .with_dry_run(mode.dry_run(config.sweep.dry_run));

    let report = run_pass(&sweep, client.as_ref())
        .await
        .context("Reconciliation pass failed")?;
    log_report(&report);

    if json {
        println!("{}", serde_json::to_string_pretty(&PassSummary::from(&report))?);
    }
    Ok(())
}

async fn run_daemon(config: &Config, mode: ModeArgs) -> Result<()> {
    let client = connect(config)?;
    let sweep = config
        .sweep
        .clone()
        .with_dry_run(mode.dry_run(config.sweep.dry_run));
    let period = Duration::from_secs(config.schedule.interval_secs);
    info!(
        "Running a pass every {}s (dry run: {})",
        period.as_secs(),
        sweep.dry_run
    );

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    // Listeners live across passes so a signal received mid-pass is seen
    // as soon as the pass finishes.
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
            _ = interval.tick() => {
                match run_pass(&sweep, client.as_ref()).await {
                    Ok(report) => log_report(&report),
                    Err(e) => error!("Pass failed: {}", e),
                }
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

async fn check(config: &Config) -> Result<()> {
    let client = connect(config)?;
    let session = client
        .session_info()
        .await
        .context("Torrent client is not reachable")?;
    info!("Connected to {} {}", session.backend, session.version);
    println!("{} {}", session.backend, session.version);
    Ok(())
}
