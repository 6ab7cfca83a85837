//! Server configuration.

use std::time::Duration;

use rookline_registry::RegistryConfig;

/// Everything the server needs to start. Built through
/// [`RooklineServerBuilder`](crate::RooklineServerBuilder) or mapped from
/// the command line by the `rookline-server` binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to. Port 0 picks a free port.
    pub bind_addr: String,

    /// Role assignment and reconnection settings.
    pub registry: RegistryConfig,

    /// How long a new connection has to send `hello`.
    pub handshake_timeout: Duration,

    /// Position the game starts from, as FEN. `None` is the standard
    /// starting position.
    pub start_fen: Option<String>,

    /// Capacity of the session actor's command queue.
    pub channel_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            registry: RegistryConfig::default(),
            handshake_timeout: Duration::from_secs(5),
            start_fen: None,
            channel_size: 64,
        }
    }
}
