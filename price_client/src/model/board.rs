//! Live price board.
//!
//! Keeps the last price, the change against the previous update, and a rolling history
//! of at most `HISTORY_LIMIT` samples per ticker. Both acknowledgements and broadcasts
//! are applied the same way. Only the current subscription set is shown; rows of
//! tickers that were unsubscribed are dropped.
use chrono::{DateTime, Local};
use price_common::{PriceMap, Ticker};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Write;

/// Samples kept per ticker.
pub const HISTORY_LIMIT: usize = 60;

#[derive(Debug, Default)]
struct Row {
    previous: Option<f64>,
    history: VecDeque<f64>,
}

impl Row {
    fn last(&self) -> Option<f64> {
        self.history.back().copied()
    }

    fn push(&mut self, price: f64) {
        self.previous = self.last();
        self.history.push_back(price);
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

/// Prices received for the subscribed tickers.
#[derive(Debug, Default)]
pub struct PriceBoard {
    subscribed: BTreeSet<Ticker>,
    rows: BTreeMap<Ticker, Row>,
    updated_at: Option<DateTime<Local>>,
}

impl PriceBoard {
    pub fn new(subscribed: BTreeSet<Ticker>) -> Self {
        Self {
            subscribed,
            ..Self::default()
        }
    }

    /// Switches to a new subscription set, forgetting rows outside it.
    pub fn resubscribe(&mut self, subscribed: BTreeSet<Ticker>) {
        self.rows.retain(|ticker, _| subscribed.contains(ticker));
        self.subscribed = subscribed;
    }

    /// Records one `prices` payload received at `at`. Tickers outside the subscription
    /// set are ignored.
    pub fn apply(&mut self, prices: &PriceMap, at: DateTime<Local>) {
        for (ticker, price) in prices {
            if self.subscribed.contains(ticker) {
                self.rows.entry(*ticker).or_default().push(*price);
            }
        }
        self.updated_at = Some(at);
    }

    pub fn last(&self, ticker: Ticker) -> Option<f64> {
        self.rows.get(&ticker).and_then(Row::last)
    }

    /// Difference between the last two updates of `ticker`.
    pub fn change(&self, ticker: Ticker) -> Option<f64> {
        let row = self.rows.get(&ticker)?;
        Some(row.last()? - row.previous?)
    }

    pub fn history(&self, ticker: Ticker) -> Vec<f64> {
        self.rows
            .get(&ticker)
            .map(|r| r.history.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Renders the board as a fixed-width table.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(at) = self.updated_at {
            let _ = writeln!(out, "Prices at {}", at.format("%H:%M:%S"));
        }
        let _ = writeln!(out, "{:<6} {:>10} {:>8} {:>10} {:>10}", "SYM", "PRICE", "CHANGE", "LOW", "HIGH");
        if self.subscribed.is_empty() {
            let _ = writeln!(out, "No subscriptions");
            return out;
        }

        for ticker in self.subscribed.iter().copied() {
            let Some(last) = self.last(ticker) else {
                let _ = writeln!(out, "{:<6} {:>10} {:>8} {:>10} {:>10}", ticker, "--", "--", "--", "--");
                continue;
            };
            let change = self
                .change(ticker)
                .map(|c| format!("{:+.2}", c))
                .unwrap_or_else(|| "--".into());
            let history = self.history(ticker);
            let low = history.iter().copied().fold(f64::INFINITY, f64::min);
            let high = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let _ = writeln!(
                out,
                "{:<6} {:>10.2} {:>8} {:>10.2} {:>10.2}",
                ticker, last, change, low, high
            );
        }
        out
    }
}
