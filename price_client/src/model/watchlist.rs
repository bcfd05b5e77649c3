//! Subscriptions chosen by the user and the commands that edit them.
//!
//! The server replaces a session's set on every `subscribe`, so any change here is
//! followed by sending the whole list again.
use price_common::Ticker;
use std::collections::BTreeSet;

/// One line typed on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// `+SYM`
    Add(String),
    /// `-SYM`
    Remove(String),
    /// `SYM` on its own: add it if missing, remove it otherwise.
    Toggle(String),
    /// `logout` or `quit`
    Logout,
}

impl UserCommand {
    /// Parses a line; blank lines yield `None`. Symbols are upper-cased.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.eq_ignore_ascii_case("logout") || line.eq_ignore_ascii_case("quit") {
            return Some(Self::Logout);
        }

        let symbol = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_ascii_uppercase())
        };
        if let Some(rest) = line.strip_prefix('+') {
            symbol(rest).map(Self::Add)
        } else if let Some(rest) = line.strip_prefix('-') {
            symbol(rest).map(Self::Remove)
        } else {
            symbol(line).map(Self::Toggle)
        }
    }
}

/// Outcome of applying a command to the watchlist.
#[derive(Debug, PartialEq, Eq)]
pub enum Change {
    Updated,
    Unchanged,
    Unsupported(String),
}

/// Requested symbols in the order they were added.
#[derive(Debug, Default)]
pub struct Watchlist {
    symbols: Vec<String>,
}

impl Watchlist {
    /// Builds the startup list; duplicates are dropped, unsupported symbols are kept so
    /// the server gets to reject them.
    pub fn new(symbols: impl IntoIterator<Item = String>) -> Self {
        let mut list = Self::default();
        for symbol in symbols {
            if !list.contains(&symbol) {
                list.symbols.push(symbol);
            }
        }
        list
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Supported tickers among the requested symbols.
    pub fn tickers(&self) -> BTreeSet<Ticker> {
        self.symbols.iter().filter_map(|s| s.parse().ok()).collect()
    }

    /// Applies an edit. Only supported tickers can be added interactively; removal
    /// accepts anything currently listed. `Logout` leaves the list alone.
    pub fn apply(&mut self, command: &UserCommand) -> Change {
        match command {
            UserCommand::Add(symbol) => self.add(symbol),
            UserCommand::Remove(symbol) => self.remove(symbol),
            UserCommand::Toggle(symbol) if self.contains(symbol) => self.remove(symbol),
            UserCommand::Toggle(symbol) => self.add(symbol),
            UserCommand::Logout => Change::Unchanged,
        }
    }

    fn add(&mut self, symbol: &str) -> Change {
        if symbol.parse::<Ticker>().is_err() {
            return Change::Unsupported(symbol.to_string());
        }
        if self.contains(symbol) {
            return Change::Unchanged;
        }
        self.symbols.push(symbol.to_string());
        Change::Updated
    }

    fn remove(&mut self, symbol: &str) -> Change {
        let before = self.symbols.len();
        self.symbols.retain(|s| s != symbol);
        if self.symbols.len() == before {
            Change::Unchanged
        } else {
            Change::Updated
        }
    }
}
