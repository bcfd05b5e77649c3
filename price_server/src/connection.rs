//! WebSocket connection handling.
//!
//! Each accepted TCP stream is upgraded to a WebSocket and served on its own thread.
//! The thread alternates between reading client frames (with a short read timeout) and
//! flushing the broadcast payloads queued for its session. Whatever ends the connection,
//! the session is removed from the shared state before the thread exits.

use crate::model::session::ConnectionId;
use crate::state::ServerState;
use crossbeam_channel::Receiver;
use log::{debug, info};
use price_common::{Result, ServerMessage, StreamError};
use std::io;
use std::net::TcpStream;
use std::time::Duration;
use tungstenite::{HandshakeError, Message, WebSocket};

/// How long a read may block before queued broadcasts are flushed.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upgrade `stream` and serve it until the client goes away.
pub fn serve(stream: TcpStream, state: &ServerState) -> Result<()> {
    let peer = stream.peer_addr()?;
    let mut socket = tungstenite::accept(stream).map_err(|e| match e {
        HandshakeError::Failure(err) => StreamError::from(err),
        HandshakeError::Interrupted(_) => StreamError::Io(io::Error::from(io::ErrorKind::WouldBlock)),
    })?;
    socket.get_ref().set_read_timeout(Some(POLL_INTERVAL))?;

    let (id, outbound) = state.connect()?;
    info!("{} opened from {}", id, peer);

    let result = run(&mut socket, id, &outbound, state);
    state.disconnect(id)?;
    result
}

fn run(
    socket: &mut WebSocket<TcpStream>,
    id: ConnectionId,
    outbound: &Receiver<ServerMessage>,
    state: &ServerState,
) -> Result<()> {
    loop {
        match socket.read() {
            Ok(Message::Text(text)) => {
                if let Some(reply) = state.handle_text(id, text.as_str())? {
                    // Payloads queued for the previous subscription set go out first.
                    flush(socket, outbound)?;
                    send(socket, &reply)?;
                }
            }
            Ok(Message::Binary(_)) => debug!("Discarding binary frame from {}", id),
            Ok(Message::Close(frame)) => {
                debug!("{} sent close: {:?}", id, frame);
                continue;
            }
            Ok(_) => {}
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                return Ok(());
            }
            Err(e) => {
                let e = StreamError::from(e);
                if !e.is_timeout() {
                    return Err(e);
                }
            }
        }

        flush(socket, outbound)?;
    }
}

fn flush(socket: &mut WebSocket<TcpStream>, outbound: &Receiver<ServerMessage>) -> Result<()> {
    for message in outbound.try_iter() {
        send(socket, &message)?;
    }
    Ok(())
}

fn send(socket: &mut WebSocket<TcpStream>, message: &ServerMessage) -> Result<()> {
    socket.send(Message::text(message.to_json()?))?;
    Ok(())
}
