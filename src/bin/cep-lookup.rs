use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use deadline_fetch::config::load_or_default;
use deadline_fetch::coordination::{race, Deadline, ErrorKind, Outcome};
use deadline_fetch::observability::logging;
use deadline_fetch::providers::{BrasilApi, ProviderCall, ViaCep};
use deadline_fetch::record::Address;

#[derive(Parser)]
#[command(name = "cep-lookup")]
#[command(about = "Resolve a CEP against BrasilAPI and ViaCEP; the first answer wins", long_about = None)]
struct Cli {
    /// Postal code, with or without the dash (01001-000 or 01001000).
    cep: String,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the lookup deadline in milliseconds.
    #[arg(long)]
    deadline_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    let client = reqwest::Client::builder().build()?;
    let providers: Vec<Arc<dyn ProviderCall>> = vec![
        Arc::new(BrasilApi::new(client.clone(), config.providers.brasilapi_url.clone())),
        Arc::new(ViaCep::new(client, config.providers.viacep_url.clone())),
    ];

    let budget = cli
        .deadline_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.timeouts.lookup());

    match race(&providers, &cli.cep, Deadline::after(budget)).await {
        Outcome::Success(record) => {
            println!("API: {}", record.source());
            if let Some(address) = record.as_address() {
                print_address(address);
            }
            Ok(())
        }
        Outcome::Failure(failure) => {
            match failure.kind() {
                ErrorKind::Timeout => eprintln!(
                    "Timeout: no response received within {}ms",
                    budget.as_millis()
                ),
                _ => eprintln!("Lookup failed: {}", failure),
            }
            std::process::exit(1);
        }
    }
}

fn print_address(address: &Address) {
    println!("CEP: {}", address.cep);
    println!("Street: {}", address.street);
    println!("Neighborhood: {}", address.neighborhood);
    println!("City: {}", address.city);
    println!("State: {}", address.state);
}
