//! Wire messages exchanged between client and server.
//!
//! Every frame is a JSON text payload carrying a `type` discriminator:
//! - `{"type":"login","email":"..."}` — client sets its display identity.
//! - `{"type":"subscribe","stocks":["AAPL", ...]}` — client replaces its subscription set.
//! - `{"type":"prices","prices":{"AAPL":123.45}}` — server pushes current prices.
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::StreamError;
use crate::tickers::Ticker;

/// Prices keyed by ticker, ordered the same way tickers are displayed.
pub type PriceMap = BTreeMap<Ticker, f64>;

/// Message sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Sets the unverified identity label of the connection.
    Login {
        /// Opaque display label.
        email: String,
    },
    /// Replaces the full subscription set of the connection.
    Subscribe {
        /// Requested symbols; non-string entries are skipped, a missing list is empty.
        #[serde(default, deserialize_with = "string_entries")]
        stocks: Vec<String>,
    },
}

impl ClientMessage {
    /// Parses a text frame into a client message.
    pub fn parse(text: &str) -> Result<Self, StreamError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode the message as a JSON text frame.
    pub fn to_json(&self) -> Result<String, StreamError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Message sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Current prices for the subscribed tickers (acknowledgement or broadcast).
    Prices {
        /// Ticker to price.
        prices: PriceMap,
    },
}

impl ServerMessage {
    /// Parses a text frame into a server message.
    pub fn parse(text: &str) -> Result<Self, StreamError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode the message as a JSON text frame.
    pub fn to_json(&self) -> Result<String, StreamError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn string_entries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}
