//!
//! Common types and utilities shared by the price server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `StreamError` used across the workspace.
//! - `result` — handy `Result<T, StreamError>` alias.
//! - `tickers` — the fixed set of supported symbols and parsing helpers.
//! - `message` — JSON messages exchanged over the WebSocket.
//! - `net` — networking constants and endpoint helpers.
#![warn(missing_docs)]
pub mod error;
pub mod message;
pub mod net;
pub mod result;
pub mod tickers;

pub use error::StreamError;
pub use message::{ClientMessage, PriceMap, ServerMessage};
pub use result::Result;
pub use tickers::Ticker;
