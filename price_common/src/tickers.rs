//! Ticker symbols and helpers shared between client and server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::BufRead;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::StreamError;

/// Set of supported ticker symbols.
///
/// Declaration order is the display order, and `Ord` follows it, so ordered
/// collections of tickers render the same way everywhere.
#[allow(missing_docs)]
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
)]
pub enum Ticker {
    GOOG,
    TSLA,
    AMZN,
    META,
    NVDA,
    MSFT,
    AAPL,
    NFLX,
    IBM,
    ORCL,
}

impl Ticker {
    /// All supported tickers in display order.
    pub fn all() -> Vec<Ticker> {
        Ticker::iter().collect()
    }

    /// Keeps only the requested symbols that name a supported ticker.
    ///
    /// Matching is exact; unknown symbols and duplicates are dropped silently.
    pub fn filter_supported<S: AsRef<str>>(requested: &[S]) -> BTreeSet<Ticker> {
        requested
            .iter()
            .filter_map(|s| s.as_ref().parse::<Ticker>().ok())
            .collect()
    }
}

/// Reads ticker symbols from a buffered reader.
///
/// Symbols may be separated by commas, whitespace, or new lines. Symbols are
/// returned as written (trimmed); whether they are supported is decided by the server.
pub fn read_symbols<R: BufRead>(reader: R) -> Result<Vec<String>, StreamError> {
    let mut symbols = Vec::new();

    for line_result in reader.lines() {
        let line = line_result.map_err(StreamError::Io)?;
        symbols.extend(
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(String::from),
        );
    }
    Ok(symbols)
}
