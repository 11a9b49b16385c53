//! `OrbitDeck` console.
//!
//! # Usage
//!
//! ```bash
//! # List chains, sorted by name, second page
//! orbitdeck chains --sort chain-name --page 2
//!
//! # Submit a deployment
//! orbitdeck deploy --chain-id 39713 --name "Zora Network" --address 0xabc...
//!
//! # Configure logging level
//! RUST_LOG=debug orbitdeck summary
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to TOML configuration file (default: `orbitdeck.toml`)
//! - `ORBITDECK_API_URL` - Override the backend base URL
//! - `ORBITDECK_TIMEOUT_SECS` - Override the request timeout
//! - `RUST_LOG` - Log level filter (default: `info`)
//!
//! Reports are printed to stdout as JSON; logs go to stderr.

use std::io::Write;

use clap::{Parser, Subcommand, ValueEnum};
use orbitdeck::deploy::{DEFAULT_CHAIN_ID, DeploymentForm};
use orbitdeck::table::{SortField, StatusFilter};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use orbitdeck_console::commands::{self, ChainsQuery};
use orbitdeck_console::config::ConsoleConfig;

#[derive(Debug, Parser)]
#[command(name = "orbitdeck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse and deploy Arbitrum Orbit rollups")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List deployed chains
    Chains {
        /// Case-insensitive filter on chain name or id
        #[arg(short, long)]
        filter: Option<String>,
        /// Status tab
        #[arg(short, long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,
        /// Sort column
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Rows per page (default: from config)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show per-status chain counts
    Summary,

    /// List wallet networks the panel can switch to
    Networks,

    /// Request a new chain deployment
    Deploy {
        /// Numeric chain id for the new rollup
        #[arg(long, default_value_t = DEFAULT_CHAIN_ID.to_string())]
        chain_id: String,
        /// Rollup display name
        #[arg(long)]
        name: String,
        /// Deploying wallet address
        #[arg(long, env = "ORBITDECK_WALLET")]
        address: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Active,
    Paused,
    Deploying,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Active => Self::Active,
            StatusArg::Paused => Self::Paused,
            StatusArg::Deploying => Self::Deploying,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    ChainId,
    ChainName,
    Owner,
    Status,
    RpcUrl,
    CreatedAt,
    UpdatedAt,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::ChainId => Self::ChainId,
            SortArg::ChainName => Self::ChainName,
            SortArg::Owner => Self::OwnerAddress,
            SortArg::Status => Self::Status,
            SortArg::RpcUrl => Self::RpcUrl,
            SortArg::CreatedAt => Self::CreatedAt,
            SortArg::UpdatedAt => Self::UpdatedAt,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConsoleConfig::load()?;
    tracing::debug!(
        api_url = %config.api_url,
        page_size = config.page_size,
        networks = config.networks.len(),
        "Loaded configuration"
    );

    match cli.command {
        Command::Chains {
            filter,
            status,
            sort,
            desc,
            page,
            page_size,
        } => {
            let query = ChainsQuery {
                filter,
                status: status.into(),
                sort: sort.map(Into::into),
                descending: desc,
                page: page.saturating_sub(1),
                page_size,
            };
            emit(&commands::list_chains(&config, &query).await?)
        }
        Command::Summary => emit(&commands::summarize_chains(&config).await?),
        Command::Networks => emit(&commands::list_networks(&config)),
        Command::Deploy {
            chain_id,
            name,
            address,
        } => {
            let form = DeploymentForm::new(name, chain_id);
            let report = commands::deploy(&config, &form, address.as_deref()).await?;
            tracing::info!("Deployment submitted");
            emit(&report)
        }
    }
}

/// Writes `value` to stdout as pretty JSON.
fn emit<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
