/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer's protocol handshake (the WebSocket upgrade) failed.
    #[error("upgrade failed: {0}")]
    UpgradeFailed(#[source] std::io::Error),

    /// The peer did not finish its handshake in time.
    #[error("handshake timed out")]
    HandshakeTimedOut,
}
