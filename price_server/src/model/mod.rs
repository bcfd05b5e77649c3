//! Domain models of the price server.
//!
//! This module groups the in-memory state behind the WebSocket layer:
//! - `price_table` — current price per ticker and the random-walk simulator.
//! - `session` — per-connection login/subscribe state machine.
//! - `registry` — live sessions keyed by connection id, with their outbound channels.

pub mod price_table;
pub mod registry;
pub mod session;
