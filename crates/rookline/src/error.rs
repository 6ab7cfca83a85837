//! Unified error type for the server.

use rookline_protocol::ProtocolError;
use rookline_registry::RegistryError;
use rookline_rules::RulesError;
use rookline_session::SessionError;
use rookline_transport::TransportError;

/// Any error the server can hit. Each layer's error converts with `?`.
#[derive(Debug, thiserror::Error)]
pub enum RooklineError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
