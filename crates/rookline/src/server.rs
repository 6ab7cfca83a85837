//! Server builder and accept loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rookline_protocol::JsonCodec;
use rookline_registry::RegistryConfig;
use rookline_rules::RulesEngine;
use rookline_session::{GameState, SessionHandle, spawn_session};
use rookline_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{RooklineError, ServerConfig};

/// State shared by every connection task.
pub(crate) struct ServerState {
    pub(crate) session: SessionHandle,
    pub(crate) codec: JsonCodec,
    pub(crate) handshake_timeout: Duration,
}

/// Builder for [`RooklineServer`].
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), rookline::RooklineError> {
/// use rookline::prelude::*;
///
/// let server = RooklineServer::builder()
///     .bind("0.0.0.0:8080")
///     .reconnect_grace_secs(60)
///     .build(StandardRules)
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct RooklineServerBuilder {
    config: ServerConfig,
}

impl RooklineServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.config.registry = config;
        self
    }

    pub fn reconnect_grace_secs(mut self, secs: u64) -> Self {
        self.config.registry.reconnect_grace_secs = secs;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn start_fen(mut self, fen: impl Into<String>) -> Self {
        self.config.start_fen = Some(fen.into());
        self
    }

    /// Loads the start position, binds the listener and spawns the session
    /// actor.
    ///
    /// # Errors
    /// Fails if the start FEN does not load under `rules` or the address
    /// cannot be bound.
    pub async fn build<R: RulesEngine>(self, rules: R) -> Result<RooklineServer, RooklineError> {
        let ServerConfig {
            bind_addr,
            registry,
            handshake_timeout,
            start_fen,
            channel_size,
        } = self.config;

        let game = match start_fen.as_deref() {
            Some(fen) => GameState::from_fen(rules, fen)?,
            None => GameState::new(rules),
        };
        let transport = WebSocketTransport::bind(&bind_addr).await?;
        let session = spawn_session(game, registry, channel_size);

        let state = Arc::new(ServerState {
            session,
            codec: JsonCodec,
            handshake_timeout,
        });
        Ok(RooklineServer { transport, state })
    }
}

impl Default for RooklineServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running chess session behind a WebSocket listener.
pub struct RooklineServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl RooklineServer {
    pub fn builder() -> RooklineServerBuilder {
        RooklineServerBuilder::new()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RooklineError> {
        Ok(self.transport.local_addr()?)
    }

    /// A handle to the session actor, for inspection and shutdown.
    pub fn session(&self) -> SessionHandle {
        self.state.session.clone()
    }

    /// Accepts connections until the process exits, one task per
    /// connection. The WebSocket upgrade runs on that task, so a peer that
    /// never finishes it cannot hold up the accept loop.
    pub async fn run(mut self) -> Result<(), RooklineError> {
        tracing::info!("rookline server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(incoming, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
