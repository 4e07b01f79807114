pub mod config;
pub mod dashboard;
pub mod status;
pub mod summary;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::settings::{load_settings, validate_endpoint, Settings};

#[derive(Parser)]
#[command(name = "stockboard", about = "Terminal dashboard for inventory sales and purchases.")]
pub struct Cli {
    /// Dashboard endpoint for this run (overrides settings)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Month the selector starts on, e.g. March (dashboard only)
    #[arg(long)]
    pub month: Option<String>,

    /// Year the selector starts on; must be within two years back or one ahead
    #[arg(long)]
    pub year: Option<i32>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch once and print cards, chart series and recent transactions.
    Summary,
    /// Update saved settings.
    Config {
        /// Dashboard endpoint URL, e.g. http://localhost:5000/api/dashboard
        #[arg(long = "set-endpoint")]
        set_endpoint: Option<String>,
        /// Request timeout in seconds
        #[arg(long, conflicts_with = "no_timeout")]
        timeout: Option<u64>,
        /// Wait indefinitely for the dashboard endpoint
        #[arg(long = "no-timeout")]
        no_timeout: bool,
        /// Log file path
        #[arg(long = "log-file")]
        log_file: Option<String>,
    },
    /// Show current settings.
    Status,
}

/// Saved settings with the per-run `--endpoint` override applied.
pub(crate) fn effective_settings(endpoint: Option<&str>) -> Result<Settings> {
    let mut settings = load_settings();
    if let Some(endpoint) = endpoint {
        validate_endpoint(endpoint)?;
        settings.endpoint = endpoint.to_string();
    }
    Ok(settings)
}
