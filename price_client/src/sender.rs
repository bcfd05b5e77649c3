//! Sending protocol messages to the price server.
//!
//! This module provides a small helper for encoding `ClientMessage`s as WebSocket text
//! frames, plus the login-then-subscribe handshake every session starts with.
use log::info;
use price_common::{ClientMessage, StreamError};
use std::io::{Read, Write};
use tungstenite::{Message, WebSocket};

/// Helper type for sending messages to the server.
pub struct CommandSender;

impl CommandSender {
    pub fn send_message<S: Read + Write>(
        socket: &mut WebSocket<S>,
        message: &ClientMessage,
    ) -> Result<(), StreamError> {
        socket.send(Message::text(message.to_json()?))?;
        Ok(())
    }

    /// Logs in as `email`, then subscribes to `stocks`.
    pub fn start_session<S: Read + Write>(
        socket: &mut WebSocket<S>,
        email: &str,
        stocks: &[String],
    ) -> Result<(), StreamError> {
        info!("Logging in as {}", email);
        Self::send_message(
            socket,
            &ClientMessage::Login {
                email: email.to_string(),
            },
        )?;

        Self::subscribe(socket, stocks)
    }

    /// Sends the full subscription list; the server replaces the previous one.
    pub fn subscribe<S: Read + Write>(
        socket: &mut WebSocket<S>,
        stocks: &[String],
    ) -> Result<(), StreamError> {
        info!("Subscribing to {}", stocks.join(","));
        Self::send_message(
            socket,
            &ClientMessage::Subscribe {
                stocks: stocks.to_vec(),
            },
        )
    }
}
