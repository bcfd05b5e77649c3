//! Shared server state.
//!
//! `ServerState` owns the price table and the session registry, each behind its own
//! `Mutex`, and is shared between the accept loop, the connection threads and the
//! broadcast loop through an `Arc`. Locks are never held across socket I/O and never
//! nested, so the two tables cannot deadlock each other.

use crate::model::price_table::PriceTable;
use crate::model::registry::Registry;
use crate::model::session::ConnectionId;
use crossbeam_channel::{Receiver, TrySendError};
use log::{debug, info};
use price_common::{ClientMessage, PriceMap, Result, ServerMessage, Ticker};
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Prices and sessions of one running server.
pub struct ServerState {
    prices: Mutex<PriceTable>,
    registry: Mutex<Registry>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerState {
    /// Creates a state with freshly randomised prices and no sessions.
    pub fn new() -> Self {
        Self::with_prices(PriceTable::new())
    }

    /// Creates a state around an existing price table.
    pub fn with_prices(prices: PriceTable) -> Self {
        Self {
            prices: Mutex::new(prices),
            registry: Mutex::new(Registry::new()),
        }
    }

    /// Registers a new anonymous session.
    pub fn connect(&self) -> Result<(ConnectionId, Receiver<ServerMessage>)> {
        let (id, outbound) = self.registry.lock()?.register();
        info!("Client connected: {}", id);
        Ok((id, outbound))
    }

    /// Parses and applies a text frame. Malformed frames are discarded.
    pub fn handle_text(&self, id: ConnectionId, text: &str) -> Result<Option<ServerMessage>> {
        match ClientMessage::parse(text) {
            Ok(message) => self.handle_message(id, message),
            Err(e) => {
                debug!("Invalid message from {}: {}", id, e);
                Ok(None)
            }
        }
    }

    /// Applies a client message and returns the acknowledgement to send back, if any.
    pub fn handle_message(
        &self,
        id: ConnectionId,
        message: ClientMessage,
    ) -> Result<Option<ServerMessage>> {
        match message {
            ClientMessage::Login { email } => {
                if let Some(session) = self.registry.lock()?.session_mut(id) {
                    info!("Logged in: {} as {}", id, email);
                    session.login(email);
                }
                Ok(None)
            }
            ClientMessage::Subscribe { stocks } => {
                let tickers = {
                    let mut registry = self.registry.lock()?;
                    let Some(tickers) = registry
                        .session(id)
                        .and_then(|s| s.accept_subscription(&stocks))
                    else {
                        debug!("Ignoring subscribe from {} before login", id);
                        return Ok(None);
                    };
                    registry.set(id, tickers.clone());
                    tickers
                };
                info!("{} subscribed to {:?}", id, tickers);

                let prices = self.prices.lock()?.snapshot(&tickers);
                Ok(Some(ServerMessage::Prices { prices }))
            }
        }
    }

    /// Drops the session of `id`; later cycles no longer see it.
    pub fn disconnect(&self, id: ConnectionId) -> Result<()> {
        let removed = self.registry.lock()?.remove(id);
        let label = removed
            .as_ref()
            .and_then(|s| s.identity())
            .unwrap_or("<anonymous>");
        info!("Client disconnected: {} ({})", id, label);
        Ok(())
    }

    /// Runs one broadcast cycle: advances every price, then hands each identified session
    /// with subscriptions a `prices` message restricted to its tickers.
    ///
    /// Returns the number of messages handed off. Connections whose receiver is gone or
    /// whose queue is full are skipped; the cycle never blocks on a slow reader.
    pub fn broadcast_cycle(&self) -> Result<usize> {
        let prices = {
            let mut table = self.prices.lock()?;
            table.tick();
            table.all().clone()
        };

        let registry = self.registry.lock()?;
        let mut delivered = 0;
        for delivery in registry.deliveries() {
            let payload: PriceMap = delivery
                .tickers
                .iter()
                .filter_map(|t| prices.get(t).map(|p| (*t, *p)))
                .collect();

            match delivery.outbound.try_send(ServerMessage::Prices { prices: payload }) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!("Skipping {}: outbound queue is full", delivery.id)
                }
                Err(TrySendError::Disconnected(_)) => {
                    debug!("Skipping {}: connection is gone", delivery.id)
                }
            }
        }
        Ok(delivered)
    }

    /// Current prices of every ticker.
    pub fn prices(&self) -> Result<PriceMap> {
        Ok(self.prices.lock()?.all().clone())
    }

    /// Current subscription set of `id`, empty if unknown.
    pub fn subscriptions(&self, id: ConnectionId) -> Result<BTreeSet<Ticker>> {
        Ok(self.registry.lock()?.get(id))
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.registry.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::registry::OUTBOUND_CAPACITY;

    fn logged_in(state: &ServerState, email: &str) -> (ConnectionId, Receiver<ServerMessage>) {
        let (id, rx) = state.connect().unwrap();
        state.handle_text(id, &format!(r#"{{"type":"login","email":"{}"}}"#, email)).unwrap();
        (id, rx)
    }

    fn subscribe(state: &ServerState, id: ConnectionId, stocks: &[&str]) -> Option<ServerMessage> {
        state
            .handle_message(
                id,
                ClientMessage::Subscribe {
                    stocks: stocks.iter().map(|s| s.to_string()).collect(),
                },
            )
            .unwrap()
    }

    fn keys(message: &ServerMessage) -> Vec<Ticker> {
        let ServerMessage::Prices { prices } = message;
        prices.keys().copied().collect()
    }

    #[test]
    fn test_subscribe_before_login_is_ignored() {
        let state = ServerState::new();
        let (id, rx) = state.connect().unwrap();

        assert_eq!(subscribe(&state, id, &["GOOG"]), None);
        assert!(state.subscriptions(id).unwrap().is_empty());

        state.broadcast_cycle().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_ack_carries_current_prices() {
        let mut table = PriceTable::new();
        table.set(Ticker::GOOG, 150.0);
        table.set(Ticker::TSLA, 420.42);
        let state = ServerState::with_prices(table);
        let (id, _rx) = logged_in(&state, "alice@gmail.com");

        let ack = subscribe(&state, id, &["TSLA", "GOOG"]).unwrap();
        let ServerMessage::Prices { prices } = ack;
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[&Ticker::GOOG], 150.0);
        assert_eq!(prices[&Ticker::TSLA], 420.42);
    }

    #[test]
    fn test_subscribe_replaces_and_filters() {
        let state = ServerState::new();
        let (id, _rx) = logged_in(&state, "alice@gmail.com");

        subscribe(&state, id, &["GOOG", "TSLA", "AMZN"]);
        let ack = subscribe(&state, id, &["AAPL", "ZZZZ", "AAPL"]).unwrap();

        assert_eq!(keys(&ack), vec![Ticker::AAPL]);
        assert_eq!(state.subscriptions(id).unwrap(), BTreeSet::from([Ticker::AAPL]));
    }

    #[test]
    fn test_subscribe_to_nothing_valid_acks_empty() {
        let state = ServerState::new();
        let (id, _rx) = logged_in(&state, "alice@gmail.com");

        let ack = subscribe(&state, id, &["ZZZZ"]).unwrap();
        assert!(keys(&ack).is_empty());
        assert!(state.subscriptions(id).unwrap().is_empty());
    }

    #[test]
    fn test_relogin_resets_subscriptions() {
        let state = ServerState::new();
        let (id, rx) = logged_in(&state, "alice@gmail.com");
        subscribe(&state, id, &["NVDA"]);

        state.handle_text(id, r#"{"type":"login","email":"bob@gmail.com"}"#).unwrap();
        assert!(state.subscriptions(id).unwrap().is_empty());
        assert_eq!(state.broadcast_cycle().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_malformed_frames_are_discarded() {
        let state = ServerState::new();
        let (id, _rx) = state.connect().unwrap();

        for frame in ["", "{", "[]", r#"{"type":"hello"}"#, r#"{"type":"subscribe","stocks":3}"#] {
            assert_eq!(state.handle_text(id, frame).unwrap(), None);
        }
        assert_eq!(state.session_count().unwrap(), 1);
    }

    #[test]
    fn test_broadcast_filters_per_session() {
        let state = ServerState::new();
        let (alice, alice_rx) = logged_in(&state, "alice@gmail.com");
        let (bob, bob_rx) = logged_in(&state, "bob@gmail.com");
        let (_idle, idle_rx) = logged_in(&state, "idle@gmail.com");
        subscribe(&state, alice, &["GOOG", "TSLA"]);
        subscribe(&state, bob, &["ORCL"]);

        for _ in 0..3 {
            assert_eq!(state.broadcast_cycle().unwrap(), 2);
            let current = state.prices().unwrap();

            let alice_msg = alice_rx.try_recv().unwrap();
            assert_eq!(keys(&alice_msg), vec![Ticker::GOOG, Ticker::TSLA]);
            let ServerMessage::Prices { prices } = bob_rx.try_recv().unwrap();
            assert_eq!(prices.len(), 1);
            assert_eq!(prices[&Ticker::ORCL], current[&Ticker::ORCL]);
        }
        assert!(idle_rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_session_is_not_referenced() {
        let state = ServerState::new();
        let (id, rx) = logged_in(&state, "alice@gmail.com");
        subscribe(&state, id, &["IBM"]);

        state.disconnect(id).unwrap();
        assert_eq!(state.session_count().unwrap(), 0);
        assert_eq!(state.broadcast_cycle().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_does_not_abort_cycle() {
        let state = ServerState::new();
        let (gone, gone_rx) = logged_in(&state, "gone@gmail.com");
        let (live, live_rx) = logged_in(&state, "live@gmail.com");
        subscribe(&state, gone, &["MSFT"]);
        subscribe(&state, live, &["MSFT"]);
        drop(gone_rx);

        assert_eq!(state.broadcast_cycle().unwrap(), 1);
        assert!(live_rx.try_recv().is_ok());
    }

    #[test]
    fn test_full_queue_is_skipped_without_blocking() {
        let state = ServerState::new();
        let (stalled, stalled_rx) = logged_in(&state, "stalled@gmail.com");
        let (live, live_rx) = logged_in(&state, "live@gmail.com");
        subscribe(&state, stalled, &["NFLX"]);
        subscribe(&state, live, &["NFLX"]);

        for _ in 0..OUTBOUND_CAPACITY {
            assert_eq!(state.broadcast_cycle().unwrap(), 2);
            live_rx.try_recv().unwrap();
        }
        assert_eq!(stalled_rx.len(), OUTBOUND_CAPACITY);

        assert_eq!(state.broadcast_cycle().unwrap(), 1);
        assert_eq!(stalled_rx.len(), OUTBOUND_CAPACITY);
        assert!(live_rx.try_recv().is_ok());

        stalled_rx.try_recv().unwrap();
        assert_eq!(state.broadcast_cycle().unwrap(), 2);
    }
}
