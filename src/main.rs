//! SWAPI Cache - fetch paginated Star Wars API collections from the command line
//!
//! Prints the requested resource, collection or character profile as pretty JSON
//! on stdout. Logs go to stderr and are controlled with `RUST_LOG`.

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use swapi_cache::cli::{Cli, Command};
use swapi_cache::{RetrievalConfig, SwapiClient};

/// Installs the stderr log subscriber, defaulting to warnings only
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let client = SwapiClient::new(RetrievalConfig::from_cli(&cli));

    let output: Value = match &cli.command {
        Command::Record { path } => client.fetch(path).await?,
        Command::Collection {
            path,
            uncached: true,
            strategy,
        } => serde_json::to_value(client.fetch_all_with(path, (*strategy).into()).await?)?,
        Command::Collection { path, .. } => {
            let collection = client.collection(path).await?;
            serde_json::to_value(collection.as_slice())?
        }
        Command::Character { id } => match client.character(id).await? {
            Some(character) => serde_json::to_value(character)?,
            None => return Err(format!("No character with id '{id}'").into()),
        },
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
