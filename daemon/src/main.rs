//! idsync daemon — entry point for running the profile sync service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use idsync_service::{ServiceConfig, SyncMetrics, SyncService};
use idsync_store_lmdb::{LmdbStore, DEFAULT_MAP_SIZE};
use idsync_utils::LogFormat;

#[derive(Parser)]
#[command(name = "idsync-daemon", about = "Profile sync service daemon")]
struct Cli {
    /// Address the RPC server binds.
    #[arg(long, env = "IDSYNC_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Data directory for LMDB storage.
    #[arg(long, env = "IDSYNC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base URL of the notification bot; unset disables notifications.
    #[arg(long, env = "IDSYNC_NOTIFY_BASE_URL")]
    notify_base_url: Option<String>,

    /// Upper bound on concurrently syncing users.
    #[arg(long, env = "IDSYNC_MAX_CONCURRENT_SYNCS")]
    max_concurrent_syncs: Option<usize>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IDSYNC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IDSYNC_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the sync service.
    Serve,
}

/// File config as the base, CLI flags and env vars on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_toml_file(&path.display().to_string())
            .with_context(|| format!("cannot load config file {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    if let Some(addr) = &cli.listen_addr {
        config.listen_addr = addr.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(url) = &cli.notify_base_url {
        config.notify_base_url = Some(url.clone());
    }
    if let Some(limit) = cli.max_concurrent_syncs {
        config.max_concurrent_syncs = limit;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let format = LogFormat::parse(&config.log_format).unwrap_or(LogFormat::Human);
    idsync_utils::init_logging(format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("cannot create data directory {}", config.data_dir.display())
    })?;
    let store = LmdbStore::open(&config.data_dir, DEFAULT_MAP_SIZE)
        .with_context(|| format!("cannot open store at {}", config.data_dir.display()))?;

    let notifier = build_notifier(&config)?;
    if notifier.is_none() {
        tracing::info!("notifications disabled (no notify_base_url configured)");
    }

    let config = Arc::new(config);
    let service = SyncService::new(
        Arc::new(store),
        Arc::clone(&config),
        Arc::new(SyncMetrics::new()),
        notifier,
    );

    tracing::info!(
        addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        max_concurrent_syncs = config.max_concurrent_syncs,
        "starting idsync daemon"
    );
    idsync_rpc::serve(&config.listen_addr, service)
        .await
        .context("rpc server failed")?;

    Ok(())
}

fn build_notifier(
    config: &ServiceConfig,
) -> anyhow::Result<Option<Arc<idsync_notify::NotifyClient>>> {
    let Some(base_url) = config.notify_base_url.clone() else {
        return Ok(None);
    };
    let Some(seed) = config
        .resolve_notify_seed()
        .context("cannot resolve notify signing seed")?
    else {
        return Ok(None);
    };
    let signer = idsync_notify::TokenSigner::from_seed_hex(&seed)
        .context("notify signing seed is not a valid key")?;
    Ok(Some(Arc::new(idsync_notify::NotifyClient::new(
        base_url, signer,
    ))))
}
