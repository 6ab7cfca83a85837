use crate::Square;

/// Errors reported by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    /// The encoding could not be loaded as a legal position.
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// The move is not legal in the given position.
    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },

    /// A square string was not in algebraic notation.
    #[error("invalid square {0:?}")]
    InvalidSquare(String),
}
