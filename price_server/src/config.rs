//! Command-line arguments for the price server.
use clap::Parser;
use price_common::StreamError;
use price_common::net::{DEFAULT_HOST, DEFAULT_PORT, addr};
use std::time::Duration;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about = "Streams simulated stock prices to WebSocket clients", long_about = None)]
pub struct ServerArgs {
    /// Address to bind the listener to.
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Milliseconds between two broadcast cycles.
    #[arg(long, default_value_t = 1000)]
    pub tick_ms: u64,
}

impl ServerArgs {
    /// Address string the listener binds to, like "0.0.0.0:3000".
    pub fn bind_address(&self) -> String {
        addr(self.host.trim(), self.port)
    }

    /// Broadcast interval; zero is rejected.
    pub fn tick_interval(&self) -> Result<Duration, StreamError> {
        if self.tick_ms == 0 {
            return Err(StreamError::Config("--tick-ms must be greater than zero".into()));
        }
        Ok(Duration::from_millis(self.tick_ms))
    }
}
