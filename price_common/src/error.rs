//! Error types shared between client and server.
//!
//! The `StreamError` enum unifies common failure cases for I/O, the WebSocket
//! transport, JSON encoding, channel communication, and configuration, allowing
//! crates to propagate a single error type.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum StreamError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure inside the WebSocket layer (handshake, framing, closed socket).
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<tungstenite::Error>),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Channel receive failed (e.g., sender closed); contains a short context string.
    #[error("Channel receive failed: {0}")]
    ChannelRecv(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// A configuration value is out of range or cannot be used.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Origin or endpoint string that cannot be turned into a WebSocket URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Identity label rejected by client-side validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

impl From<tungstenite::Error> for StreamError {
    fn from(err: tungstenite::Error) -> Self {
        StreamError::WebSocket(Box::new(err))
    }
}

impl<T> From<PoisonError<T>> for StreamError {
    fn from(err: PoisonError<T>) -> Self {
        StreamError::MutexLock(err.to_string())
    }
}

impl StreamError {
    /// Returns `true` when the error only signals that a timed read had nothing to deliver.
    pub fn is_timeout(&self) -> bool {
        let kind = match self {
            StreamError::Io(e) => e.kind(),
            StreamError::WebSocket(e) => match e.as_ref() {
                tungstenite::Error::Io(e) => e.kind(),
                _ => return false,
            },
            _ => return false,
        };
        matches!(kind, io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
    }
}
