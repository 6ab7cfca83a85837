//! Terminal-state classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Color;

/// Number of occurrences that makes a position a threefold repetition.
pub(crate) const REPETITION_LIMIT: u8 = 3;

/// Every game-ending condition that holds for a position.
///
/// Several can hold at once (a stalemate that is also a threefold
/// repetition); [`Assessment::terminal`] picks the one to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Assessment {
    pub(crate) checkmate: Option<Color>,
    pub(crate) stalemate: bool,
    pub(crate) threefold_repetition: bool,
    pub(crate) insufficient_material: bool,
    pub(crate) fifty_move_rule: bool,
}

impl Assessment {
    pub fn is_checkmate(&self) -> bool {
        self.checkmate.is_some()
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.threefold_repetition
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.insufficient_material
    }

    /// Any drawn outcome: stalemate, repetition, insufficient material or
    /// the fifty-move rule.
    pub fn is_draw(&self) -> bool {
        self.stalemate
            || self.threefold_repetition
            || self.insufficient_material
            || self.fifty_move_rule
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// The side that delivered mate, if any.
    pub fn winner(&self) -> Option<Color> {
        self.checkmate
    }

    /// The single classification to announce, by priority: checkmate,
    /// stalemate, threefold repetition, insufficient material, then any
    /// other draw. `None` while the game is still going.
    pub fn terminal(&self) -> Option<Terminal> {
        if let Some(winner) = self.checkmate {
            Some(Terminal::Checkmate { winner })
        } else if self.stalemate {
            Some(Terminal::Stalemate)
        } else if self.threefold_repetition {
            Some(Terminal::ThreefoldRepetition)
        } else if self.insufficient_material {
            Some(Terminal::InsufficientMaterial)
        } else if self.fifty_move_rule {
            Some(Terminal::Draw)
        } else {
            None
        }
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Terminal {
    Checkmate { winner: Color },
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    Draw,
}

impl Terminal {
    /// The user-facing message for this outcome.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Checkmate { .. } => "♚ Checkmate! Game over.",
            Self::Stalemate => "Stalemate! Game over.",
            Self::ThreefoldRepetition => "Draw by threefold repetition.",
            Self::InsufficientMaterial => "Draw due to insufficient material.",
            Self::Draw => "Draw! Game over.",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_none_when_ongoing() {
        let a = Assessment::default();
        assert!(!a.is_game_over());
        assert_eq!(a.terminal(), None);
    }

    #[test]
    fn test_terminal_priority_checkmate_first() {
        let a = Assessment {
            checkmate: Some(Color::Black),
            threefold_repetition: true,
            ..Assessment::default()
        };
        assert_eq!(
            a.terminal(),
            Some(Terminal::Checkmate {
                winner: Color::Black
            })
        );
    }

    #[test]
    fn test_terminal_priority_among_draws() {
        let all = Assessment {
            stalemate: true,
            threefold_repetition: true,
            insufficient_material: true,
            fifty_move_rule: true,
            ..Assessment::default()
        };
        assert_eq!(all.terminal(), Some(Terminal::Stalemate));

        let no_stalemate = Assessment {
            stalemate: false,
            ..all
        };
        assert_eq!(no_stalemate.terminal(), Some(Terminal::ThreefoldRepetition));

        let material_and_fifty = Assessment {
            insufficient_material: true,
            fifty_move_rule: true,
            ..Assessment::default()
        };
        assert_eq!(
            material_and_fifty.terminal(),
            Some(Terminal::InsufficientMaterial)
        );

        let fifty_only = Assessment {
            fifty_move_rule: true,
            ..Assessment::default()
        };
        assert!(fifty_only.is_draw());
        assert_eq!(fifty_only.terminal(), Some(Terminal::Draw));
    }

    #[test]
    fn test_terminal_messages_are_distinct() {
        let all = [
            Terminal::Checkmate {
                winner: Color::White,
            },
            Terminal::Stalemate,
            Terminal::ThreefoldRepetition,
            Terminal::InsufficientMaterial,
            Terminal::Draw,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.message(), b.message());
            }
        }
    }
}
