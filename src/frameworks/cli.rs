// Command-line driver: one operation per invocation.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::{ClientError, Order, ReportPeriod, ReportQuery};
use crate::frameworks::client::PosClient;
use crate::frameworks::config::ClientConfig;
use crate::frameworks::logging;

#[derive(Debug, Parser)]
#[command(name = "pos_client", version, about = "Point-of-sale backend client")]
pub struct Cli {
    /// TOML config file (overrides POS_CLIENT_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in with the configured credential and print the token expiry.
    Login,
    /// Submit an order read from a JSON file.
    Order {
        /// Path to the order JSON.
        path: PathBuf,
    },
    /// Fetch a daily, weekly or monthly sales report.
    Report {
        period: ReportPeriod,
        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day of the range (YYYY-MM-DD).
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("failed to read order file {}: {source}", .path.display())]
    ReadOrder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid order file {}: {source}", .path.display())]
    ParseOrder {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

pub async fn run() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    logging::init_tracing();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?config, "client configured.");

    let client = match PosClient::new(&config) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "failed to build client");
            return ExitCode::FAILURE;
        }
    };

    // A failed operation aborts this invocation only; nothing panics.
    match execute(&client, cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "operation failed");
            ExitCode::FAILURE
        }
    }
}

/// Run one command and return what should be printed on stdout.
pub async fn execute(client: &PosClient, command: Commands) -> Result<String, CliError> {
    match command {
        Commands::Login => {
            let token = client.ensure_authenticated().await?;
            Ok(serde_json::to_string_pretty(&serde_json::json!({
                "token_preview": token.preview(),
                "issued_at": token.issued_at(),
                "expires_at": token.expires_at(),
            }))?)
        }
        Commands::Order { path } => {
            let order = read_order(path).await?;
            let persisted = client.submit_order(&order).await?;
            Ok(serde_json::to_string_pretty(&persisted)?)
        }
        Commands::Report { period, start, end } => {
            let query = ReportQuery {
                period,
                start_date: start,
                end_date: end,
            };
            let report = client.fetch_report(&query).await?;
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

async fn read_order(path: PathBuf) -> Result<Order, CliError> {
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(source) => return Err(CliError::ReadOrder { path, source }),
    };
    serde_json::from_str(&raw).map_err(|source| CliError::ParseOrder { path, source })
}
