use std::path::PathBuf;

use anyhow::Result;
use botwatch_server::{Server, ServerConfig};
use botwatch_types::parse_duration;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "botwatch-server")]
#[command(about = "Collect bot throughput stats and serve them to botwatch")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides config), e.g. "0.0.0.0:8000"
    #[arg(short, long)]
    listen: Option<String>,

    /// Number of history snapshots to keep (overrides config)
    #[arg(long)]
    max_history: Option<usize>,

    /// How long a bot stays active after its last report, e.g. "15s"
    #[arg(long)]
    active_timeout: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(max_history) = args.max_history {
        config.max_history_entries = max_history.max(1);
    }
    if let Some(ref timeout) = args.active_timeout {
        config.active_timeout = parse_duration(timeout)?;
    }

    info!(
        max_history_entries = config.max_history_entries,
        active_timeout = ?config.active_timeout,
        "starting collector"
    );

    let server = Server::bind(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
