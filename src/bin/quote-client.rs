use clap::Parser;
use std::path::PathBuf;

use deadline_fetch::config::load_or_default;
use deadline_fetch::coordination::{pipeline, Outcome};
use deadline_fetch::observability::logging;
use deadline_fetch::providers::QuoteServer;
use deadline_fetch::storage::FileStore;

#[derive(Parser)]
#[command(name = "quote-client")]
#[command(about = "Fetch the current quote from the quote server and write it to a file", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Quote server endpoint; overrides `providers.server_url`.
    #[arg(short, long)]
    url: Option<String>,

    /// Output file; overrides `storage.output_path`.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    let url = cli.url.unwrap_or_else(|| config.providers.server_url.clone());
    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.storage.output_path));

    let client = reqwest::Client::builder().build()?;
    let server = QuoteServer::new(client, url);
    let store = FileStore::new(output);

    match pipeline::run(&server, &store, "", config.timeouts.client_budgets()).await {
        Outcome::Success(record) => {
            if let Some(quote) = record.as_quote() {
                println!("{}", FileStore::render(quote));
            }
            Ok(())
        }
        Outcome::Failure(failure) => {
            tracing::error!(error = %failure, "Quote request failed");
            eprintln!("Error: {}", failure);
            std::process::exit(1);
        }
    }
}
