//! Command-line arguments for the Price Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use price_common::net::DEFAULT_PORT;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Origin the dashboard is served from; `https://` selects a secure WebSocket.
    #[arg(long, default_value_t = format!("http://localhost:{}", DEFAULT_PORT))]
    pub origin: String,

    /// Gmail address used as the display identity.
    #[arg(long)]
    pub email: String,

    /// Tickers to subscribe to, comma separated (e.g. `AAPL,TSLA`).
    #[arg(long, value_delimiter = ',')]
    pub stocks: Vec<String>,

    /// Path to a text file with additional tickers.
    /// Tickers may be separated by commas, spaces, or new lines.
    #[arg(long)]
    pub path: Option<String>,
}
