//! Quote server.
//!
//! ```text
//!   GET /cotacao
//!        │
//!        ▼
//!   ┌───────────────┐  fetch_ms   ┌──────────────┐
//!   │ quote handler │────────────▶│  AwesomeAPI  │
//!   │   (pipeline)  │◀────────────│              │
//!   │               │             └──────────────┘
//!   │               │  persist_ms ┌──────────────┐
//!   │               │────────────▶│    SQLite    │
//!   └───────────────┘             └──────────────┘
//!        │
//!        ▼
//!   200 {"bid"} │ 408 fetch timeout │ 502 fetch error │ 500 persist error
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use deadline_fetch::config::load_or_default;
use deadline_fetch::lifecycle::{signals, Shutdown};
use deadline_fetch::observability::{logging, metrics};
use deadline_fetch::providers::AwesomeApi;
use deadline_fetch::storage::SqliteStore;
use deadline_fetch::HttpServer;

#[derive(Parser)]
#[command(name = "deadline-fetch")]
#[command(about = "Serves the latest USD-BRL quote, stored in SQLite under a strict deadline")]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    tracing::info!("deadline-fetch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        fetch_ms = config.timeouts.fetch_ms,
        persist_ms = config.timeouts.persist_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let store = SqliteStore::open(Path::new(&config.storage.database_path))?;
    let client = reqwest::Client::builder().build()?;
    let quotes = AwesomeApi::new(client, config.providers.quote_url.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::forward_signals(shutdown.clone()));

    let server = HttpServer::new(config, Arc::new(quotes), Arc::new(store));
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
