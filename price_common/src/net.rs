//! Shared networking constants and helpers used by client and server.

use crate::error::StreamError;

/// Default HTTP/WebSocket port of the price server.
pub const DEFAULT_PORT: u16 = 3000;
/// Default bind address of the price server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Derives the WebSocket endpoint from the origin a client was loaded from.
///
/// A secure origin (`https://`) selects `wss://`, a plain one (`http://`) selects
/// `ws://`. WebSocket URLs are accepted as they are. Only the host part of the origin
/// is kept, the endpoint always points at `/`.
pub fn websocket_url(origin: &str) -> Result<String, StreamError> {
    let origin = origin.trim();
    let (scheme, rest) = origin
        .split_once("://")
        .ok_or_else(|| StreamError::InvalidEndpoint(origin.to_string()))?;

    let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        _ => return Err(StreamError::InvalidEndpoint(origin.to_string())),
    };

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(StreamError::InvalidEndpoint(origin.to_string()));
    }
    Ok(format!("{}://{}/", ws_scheme, host))
}
