//! Simulated price table.
//!
//! `PriceTable` holds the current price of every supported ticker. Each tick moves every
//! price by a step drawn uniformly from `[-MAX_STEP, MAX_STEP)`, clamps it to
//! `PRICE_FLOOR`, and rounds to cents. Initial prices are drawn from
//! `INITIAL_PRICE_RANGE`.

use price_common::{PriceMap, Ticker};
use rand::Rng;
use std::ops::Range;

/// Lowest price a ticker can reach.
pub const PRICE_FLOOR: f64 = 1.0;
/// Largest absolute move applied in a single tick.
pub const MAX_STEP: f64 = 5.0;
/// Range the starting prices are drawn from.
pub const INITIAL_PRICE_RANGE: Range<f64> = 100.0..1500.0;

/// Current price of every supported ticker.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: PriceMap,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceTable {
    /// Creates a table with independently seeded random prices.
    pub fn new() -> Self {
        Self::with_rng(&mut rand::rng())
    }

    /// Creates a table drawing the initial prices from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let prices = Ticker::all()
            .into_iter()
            .map(|ticker| (ticker, round_cents(rng.random_range(INITIAL_PRICE_RANGE))))
            .collect();
        Self { prices }
    }

    /// Calculate the next price of a random walk starting at `current_price`.
    pub fn next_price<R: Rng + ?Sized>(current_price: f64, rng: &mut R) -> f64 {
        let change: f64 = rng.random_range(-MAX_STEP..MAX_STEP);
        round_cents((current_price + change).max(PRICE_FLOOR))
    }

    /// Advances every ticker by one random-walk step.
    pub fn tick(&mut self) {
        self.tick_with(&mut rand::rng());
    }

    /// Advances every ticker by one step drawn from `rng`.
    pub fn tick_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for price in self.prices.values_mut() {
            *price = Self::next_price(*price, rng);
        }
    }

    /// Prices restricted to `tickers`.
    pub fn snapshot<'a, I>(&self, tickers: I) -> PriceMap
    where
        I: IntoIterator<Item = &'a Ticker>,
    {
        tickers
            .into_iter()
            .filter_map(|t| self.prices.get(t).map(|p| (*t, *p)))
            .collect()
    }

    /// All current prices.
    pub fn all(&self) -> &PriceMap {
        &self.prices
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, ticker: Ticker, price: f64) {
        self.prices.insert(ticker, round_cents(price));
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
