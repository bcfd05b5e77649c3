//! TCP accept loop for WebSocket clients.
//!
//! `PriceListener` owns the listening socket and hands every accepted stream to
//! `connection::serve` on a dedicated thread.
use crate::connection;
use crate::state::ServerState;
use log::{debug, error, info};
use price_common::Result;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

/// TCP listener that accepts WebSocket clients.
///
/// Every accepted stream is handed to its own thread, so a failing client never stops
/// the server from accepting others.
pub struct PriceListener {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl PriceListener {
    /// Bind a new listener to the provided `bind_addr` (e.g., `0.0.0.0:3000`).
    pub fn bind(bind_addr: &str) -> Result<Self> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking loop that accepts connections and serves each one on a new thread.
    ///
    /// Accept errors are logged and skipped; the loop only returns if the listening
    /// socket itself cannot report its address.
    pub fn accept_loop(self, state: Arc<ServerState>) -> Result<()> {
        info!("WebSocket listener started on {}", self.socket.local_addr()?);

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let state = Arc::clone(&state);
                    thread::spawn(move || {
                        if let Err(e) = connection::serve(stream, &state) {
                            debug!("Connection ended with error: {}", e);
                        }
                    });
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}
