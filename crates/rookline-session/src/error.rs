//! Error types for the session layer.

use rookline_registry::RegistryError;
use rookline_rules::{Color, RulesError, Square};

/// Errors from driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Admission or release failed in the role registry.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The configured start position does not load.
    #[error("invalid start position: {0}")]
    InvalidStart(#[from] RulesError),

    /// The session actor has stopped, so the command could not be
    /// delivered or its reply never came.
    #[error("session is unavailable")]
    Unavailable,
}

/// Why a move intent was refused. Sent to the originating connection as
/// `move-rejected` and never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("spectators cannot move")]
    Spectator,

    #[error("it is {to_move}'s turn")]
    NotYourTurn { to_move: Color },

    #[error("no piece on {0}")]
    EmptySquare(Square),

    #[error("the piece on {0} is not yours")]
    NotYourPiece(Square),

    #[error(transparent)]
    Illegal(RulesError),
}
