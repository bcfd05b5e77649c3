//! Per-connection session state.
//!
//! A session starts `Anonymous` and becomes `Identified` on login. Subscriptions are
//! only honored once identified, and every accepted subscribe replaces the full set.
//! Logging in again overwrites the label and clears the subscriptions.

use price_common::Ticker;
use std::collections::BTreeSet;
use std::fmt;

/// Opaque handle of one live connection, issued by the registry at connect time.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Login state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no login received yet.
    Anonymous,
    /// Logged in with an unverified label.
    Identified(String),
}

/// Server-side state of one connection.
#[derive(Debug, Clone)]
pub struct ClientSession {
    id: ConnectionId,
    state: SessionState,
    subscriptions: BTreeSet<Ticker>,
}

impl ClientSession {
    /// Creates an anonymous session without subscriptions.
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: SessionState::Anonymous,
            subscriptions: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Identity label, if the session has logged in.
    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            SessionState::Anonymous => None,
            SessionState::Identified(label) => Some(label),
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self.state, SessionState::Identified(_))
    }

    pub fn subscriptions(&self) -> &BTreeSet<Ticker> {
        &self.subscriptions
    }

    /// Records `label` as the identity and resets the subscriptions.
    pub fn login(&mut self, label: impl Into<String>) {
        self.state = SessionState::Identified(label.into());
        self.subscriptions.clear();
    }

    /// Resolves a subscribe request into the set that should replace the current one.
    ///
    /// Returns `None` while anonymous; the request must then be ignored.
    pub fn accept_subscription<S: AsRef<str>>(&self, requested: &[S]) -> Option<BTreeSet<Ticker>> {
        if !self.is_identified() {
            return None;
        }
        Some(Ticker::filter_supported(requested))
    }

    pub(crate) fn replace_subscriptions(&mut self, tickers: BTreeSet<Ticker>) {
        self.subscriptions = tickers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_anonymous() {
        let session = ClientSession::new(ConnectionId(1));
        assert_eq!(session.state(), &SessionState::Anonymous);
        assert_eq!(session.identity(), None);
        assert!(session.subscriptions().is_empty());
    }

    #[test]
    fn test_subscribe_requires_login() {
        let mut session = ClientSession::new(ConnectionId(1));
        assert_eq!(session.accept_subscription(&["AAPL"]), None);

        session.login("alice@gmail.com");
        let accepted = session.accept_subscription(&["AAPL", "ZZZZ"]).unwrap();
        assert_eq!(accepted, BTreeSet::from([Ticker::AAPL]));
    }

    #[test]
    fn test_relogin_overwrites_and_resets() {
        let mut session = ClientSession::new(ConnectionId(9));
        session.login("alice@gmail.com");
        session.replace_subscriptions(BTreeSet::from([Ticker::IBM, Ticker::ORCL]));

        session.login("bob@gmail.com");
        assert_eq!(session.identity(), Some("bob@gmail.com"));
        assert!(session.subscriptions().is_empty());
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(12).to_string(), "conn#12");
    }
}
