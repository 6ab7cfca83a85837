//! Error types for the client.

use rookline_protocol::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The WebSocket failed to connect, send, or receive.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server refused the connection with an `error` message.
    #[error("server error {code}: {message}")]
    Server { code: u16, message: String },

    /// The server closed the connection before the handshake completed.
    #[error("connection closed during handshake")]
    Closed,
}
