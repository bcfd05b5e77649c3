//! Client-side models.
//!
//! - `board` — last prices, changes and short history of the subscribed tickers.
//! - `email` — client-side validation of the login address.
//! - `watchlist` — requested tickers and the stdin commands that edit them.
pub mod board;
pub mod email;
pub mod watchlist;
