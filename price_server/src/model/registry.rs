//! Registry of live sessions.
//!
//! The registry is the single owner of every session's state. Entries are keyed by
//! `ConnectionId`, so two connections that log in with the same label stay independent.
//! Each entry carries the sending half of the bounded channel its connection thread
//! drains.
//!
//! The registry is not synchronized; `ServerState` keeps it behind a `Mutex`.

use crate::model::session::{ClientSession, ConnectionId};
use crossbeam_channel::{Receiver, Sender, bounded};
use price_common::{ServerMessage, Ticker};
use std::collections::{BTreeSet, HashMap};

/// Payloads a connection may have pending before broadcasts to it are skipped.
pub const OUTBOUND_CAPACITY: usize = 64;

struct SessionEntry {
    session: ClientSession,
    outbound: Sender<ServerMessage>,
}

/// One pending push of a broadcast cycle.
pub struct Delivery {
    /// Target connection.
    pub id: ConnectionId,
    /// Tickers the connection is subscribed to; never empty.
    pub tickers: BTreeSet<Ticker>,
    /// Channel drained by the connection thread.
    pub outbound: Sender<ServerMessage>,
}

/// Live sessions keyed by connection id.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<ConnectionId, SessionEntry>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an anonymous session and returns its id with the receiving half of its
    /// outbound channel.
    pub fn register(&mut self) -> (ConnectionId, Receiver<ServerMessage>) {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        let (outbound, outbound_rx) = bounded(OUTBOUND_CAPACITY);
        self.entries.insert(
            id,
            SessionEntry {
                session: ClientSession::new(id),
                outbound,
            },
        );
        (id, outbound_rx)
    }

    pub fn session(&self, id: ConnectionId) -> Option<&ClientSession> {
        self.entries.get(&id).map(|e| &e.session)
    }

    pub fn session_mut(&mut self, id: ConnectionId) -> Option<&mut ClientSession> {
        self.entries.get_mut(&id).map(|e| &mut e.session)
    }

    /// Replaces the full subscription set of `id`. Returns `false` if `id` is unknown.
    pub fn set(&mut self, id: ConnectionId, tickers: BTreeSet<Ticker>) -> bool {
        match self.session_mut(id) {
            Some(session) => {
                session.replace_subscriptions(tickers);
                true
            }
            None => false,
        }
    }

    /// Current subscription set of `id`, empty if unknown.
    pub fn get(&self, id: ConnectionId) -> BTreeSet<Ticker> {
        self.session(id)
            .map(|s| s.subscriptions().clone())
            .unwrap_or_default()
    }

    /// Drops the session of `id`, closing its outbound channel.
    pub fn remove(&mut self, id: ConnectionId) -> Option<ClientSession> {
        self.entries.remove(&id).map(|e| e.session)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pushes the current cycle should make: identified sessions with a non-empty set.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.entries
            .values()
            .filter(|e| e.session.is_identified() && !e.session.subscriptions().is_empty())
            .map(|e| Delivery {
                id: e.session.id(),
                tickers: e.session.subscriptions().clone(),
                outbound: e.outbound.clone(),
            })
            .collect()
    }
}
