//! Error types for the registry layer.

use rookline_transport::ConnectionId;

/// Errors from admitting, reconnecting or releasing a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The connection is not registered (never admitted, or already gone).
    #[error("connection {0} is not registered")]
    NotFound(ConnectionId),

    /// The reconnection token was never issued or has been cleaned up.
    #[error("invalid reconnection token")]
    InvalidToken,

    /// The token's grace period has elapsed.
    #[error("reconnection seat expired")]
    SeatExpired,

    /// The connection id, or the seat behind a token, is already in use
    /// by a live connection.
    #[error("{0} is already connected")]
    AlreadyConnected(ConnectionId),
}
