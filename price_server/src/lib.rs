//! Price broadcast server.
//!
//! Simulates prices for a fixed set of tickers and streams them over WebSocket to
//! clients that logged in and subscribed. The building blocks:
//!
//! - `model::price_table` — random-walk price simulator.
//! - `model::session` / `model::registry` — per-connection login/subscribe state, owned
//!   by a registry keyed by connection id.
//! - `state::ServerState` — the shared, lock-protected tables and the protocol operations.
//! - `broadcaster` — timer thread running one broadcast cycle per interval.
//! - `connection` / `listener` — WebSocket upgrade and per-connection threads.
//! - `config` — command-line arguments.
#![warn(missing_docs)]
pub mod broadcaster;
pub mod config;
pub mod connection;
pub mod listener;
#[allow(missing_docs)]
pub mod model;
pub mod state;

pub use broadcaster::{BroadcastHandle, BroadcastLoop};
pub use listener::PriceListener;
pub use state::ServerState;
