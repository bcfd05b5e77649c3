//! Price broadcast server binary.
//!
//! Wires the building blocks of the `price_server` library together:
//!
//! - `PriceListener` accepts WebSocket clients on `--host:--port` (port also taken from
//!   `PORT`) and serves each one on its own thread.
//! - `BroadcastLoop` advances the simulated prices every `--tick-ms` and pushes each
//!   subscribed client its tickers.
//! - Ctrl+C (or a failing accept loop) stops the broadcast thread and exits.
//!
//! Protocol (JSON text frames):
//! - `{"type":"login","email":"alice@gmail.com"}`
//! - `{"type":"subscribe","stocks":["AAPL","TSLA"]}`
//! - server replies and broadcasts `{"type":"prices","prices":{"AAPL":123.45}}`
use clap::Parser;
use crossbeam_channel::bounded;
use log::{error, info};
use price_common::{StreamError, Ticker};
use price_server::config::ServerArgs;
use price_server::{BroadcastLoop, PriceListener, ServerState};
use std::sync::Arc;
use std::thread;

fn main() -> Result<(), StreamError> {
    init_logger();
    let args = ServerArgs::parse();
    let interval = args.tick_interval()?;

    let state = Arc::new(ServerState::new());
    let listener = PriceListener::bind(&args.bind_address())?;
    info!("Server running at http://{}", listener.local_addr()?);
    info!(
        "Supported stocks: {}",
        Ticker::all()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let broadcaster = BroadcastLoop::start(Arc::clone(&state), interval);

    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    {
        let shutdown_tx = shutdown_tx.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down server...");
            let _ = shutdown_tx.try_send(());
        })
        .map_err(|e| StreamError::Config(format!("failed to set Ctrl+C handler: {}", e)))?;
    }

    let accept_state = Arc::clone(&state);
    thread::spawn(move || {
        if let Err(e) = listener.accept_loop(accept_state) {
            error!("Accept loop failed: {}", e);
        }
        let _ = shutdown_tx.try_send(());
    });

    shutdown_rx
        .recv()
        .map_err(|e| StreamError::ChannelRecv(e.to_string()))?;
    broadcaster.stop()?;
    info!("Server stopped");
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
