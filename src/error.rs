/// Error types for the link, decoder and board loader.
///
/// None of these are fatal: the channel turns every one of them into a
/// log-book entry and keeps the session running.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("WebSocket not connected")]
    NotConnected,

    #[error("invalid peer address '{0}'")]
    InvalidAddress(String),

    #[error("socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket handshake failed: {0}")]
    Handshake(String),

    #[error("WebSocket error: {0}")]
    Socket(#[from] tungstenite::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Malformed route_index message: {0}")]
    MalformedRoute(String),

    #[error("Invalid route index: {0}")]
    InvalidIndex(String),
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("could not read board file: {0}")]
    Io(#[from] std::io::Error),

    #[error("board file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
