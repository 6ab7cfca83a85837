//! # Rookline
//!
//! A real-time chess session synchronizer. One authority holds the
//! canonical position; two players and any number of spectators connect
//! over WebSocket, receive a role, and see every accepted move as a full
//! snapshot in the same order.
//!
//! ```text
//! rookline-transport   WebSocket connections
//! rookline-protocol    envelopes, messages, codec
//! rookline-rules       chess rules (cozy-chess)
//! rookline-registry    White / Black / Spectator assignment, reconnect seats
//! rookline-session     the authority actor
//! rookline (this)      server builder, per-connection handler, binary
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rookline::prelude::*;
//!
//! # async fn demo() -> Result<(), RooklineError> {
//! let server = RooklineServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(StandardRules)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::RooklineError;
pub use server::{RooklineServer, RooklineServerBuilder};

pub mod prelude {
    pub use crate::{RooklineError, RooklineServer, RooklineServerBuilder, ServerConfig};
    pub use rookline_protocol::{
        ClientMessage, Codec, Envelope, JsonCodec, PROTOCOL_VERSION, Role, ServerMessage, Snapshot,
    };
    pub use rookline_registry::RegistryConfig;
    pub use rookline_rules::{MoveIntent, PieceKind, Position, RulesEngine, Square, StandardRules};
    pub use rookline_session::{SessionHandle, SessionInfo};
}
