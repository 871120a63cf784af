//! Command-line interface parsing for the SWAPI cache
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the [`RetrievalConfig`] the client is built from.

use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::api::RetrievalConfig;
use crate::cache::DEFAULT_TTL_MS;
use crate::data::endpoint::SWAPI_BASE_URL;
use crate::data::FetchStrategy;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The endpoint path does not start with a slash
    #[error("Invalid endpoint: '{0}'. Endpoint paths start with '/', e.g. /people")]
    InvalidEndpoint(String),
}

/// SWAPI cache - fetch and merge paginated Star Wars API collections
#[derive(Parser, Debug)]
#[command(name = "swapi-cache")]
#[command(about = "Fetch, merge and cache paginated Star Wars API collections")]
#[command(version)]
pub struct Cli {
    /// Base URL endpoint paths are appended to
    #[arg(long, value_name = "URL", default_value = SWAPI_BASE_URL, global = true)]
    pub base_url: String,

    /// Time-to-live for cached collections, in milliseconds
    #[arg(
        long,
        value_name = "MS",
        default_value_t = DEFAULT_TTL_MS,
        value_parser = clap::value_parser!(i64).range(0..),
        global = true
    )]
    pub ttl_ms: i64,

    #[command(subcommand)]
    pub command: Command,
}

/// What to retrieve
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a single resource, e.g. /people/1, without pagination
    Record {
        /// Resource path
        #[arg(value_parser = parse_endpoint_arg)]
        path: String,
    },

    /// Fetch every page of a collection, e.g. /people
    ///
    /// By default the merged collection is sorted and augmented (ids and years
    /// for /people, episode numerals for /films). With --uncached the raw pages
    /// are concatenated in page order instead.
    Collection {
        /// Collection path
        #[arg(value_parser = parse_endpoint_arg)]
        path: String,

        /// Skip the cache and transforms
        #[arg(long)]
        uncached: bool,

        /// How pages are retrieved when --uncached is given
        #[arg(long, value_enum, default_value_t = StrategyArg::FanOut)]
        strategy: StrategyArg,
    },

    /// Show a character with films, starships and species resolved to names
    Character {
        /// Position of the character in the name-sorted /people collection (1-based)
        id: String,
    },
}

/// Page retrieval strategy as given on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Follow next-page links one at a time
    Cursor,
    /// Read page 1, then request the remaining pages concurrently
    FanOut,
}

impl From<StrategyArg> for FetchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Cursor => FetchStrategy::CursorWalk,
            StrategyArg::FanOut => FetchStrategy::FanOut,
        }
    }
}

/// Validates an endpoint path argument.
///
/// # Returns
/// * `Ok(String)` if the path starts with `/`
/// * `Err(CliError::InvalidEndpoint)` otherwise
pub fn parse_endpoint_arg(s: &str) -> Result<String, CliError> {
    if s.starts_with('/') {
        Ok(s.to_string())
    } else {
        Err(CliError::InvalidEndpoint(s.to_string()))
    }
}

impl RetrievalConfig {
    /// Creates a RetrievalConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let strategy = match &cli.command {
            Command::Collection { strategy, .. } => (*strategy).into(),
            _ => FetchStrategy::default(),
        };

        RetrievalConfig {
            base_url: cli.base_url.clone(),
            ttl: Duration::milliseconds(cli.ttl_ms),
            strategy,
        }
    }
}
