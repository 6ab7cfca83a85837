//! The canonical game state and the move validation algorithm.

use std::collections::HashMap;

use rookline_protocol::{Role, Snapshot};
use rookline_rules::{Assessment, MoveIntent, Position, RulesEngine};

use crate::{Rejection, SessionError};

/// The authority's copy of the game. Nothing else may mutate a position.
pub struct GameState<R> {
    rules: R,
    position: Position,
    /// Accepted moves so far.
    version: u64,
    /// Occurrences per repetition key, including the current position.
    seen: HashMap<u64, u8>,
}

impl<R: RulesEngine> GameState<R> {
    /// A game from the standard starting position.
    pub fn new(rules: R) -> Self {
        Self::with_position(rules, Position::initial())
    }

    /// A game from `fen`, which must load under `rules`.
    pub fn from_fen(rules: R, fen: &str) -> Result<Self, SessionError> {
        let position = rules.load(fen)?;
        Ok(Self::with_position(rules, position))
    }

    fn with_position(rules: R, position: Position) -> Self {
        let seen = HashMap::from([(position.repetition_key(), 1)]);
        Self {
            rules,
            position,
            version: 0,
            seen,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// How many times the current position has occurred.
    pub fn repetitions(&self) -> u8 {
        self.seen
            .get(&self.position.repetition_key())
            .copied()
            .unwrap_or(1)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.position.to_fen(),
            version: self.version,
            repetitions: self.repetitions(),
        }
    }

    pub fn assessment(&self) -> Assessment {
        self.rules.assess(&self.position, self.repetitions())
    }

    /// Validates `intent` from a connection holding `role` and, if it is
    /// legal, makes the result the canonical position.
    ///
    /// Checks run in order: the role must be the side to move, `from` must
    /// hold one of the mover's pieces, and the rules engine must accept
    /// the move. A rejected intent leaves the state untouched.
    pub fn propose(&mut self, role: Role, intent: &MoveIntent) -> Result<Snapshot, Rejection> {
        let color = role.color().ok_or(Rejection::Spectator)?;
        let to_move = self.position.side_to_move();
        if color != to_move {
            return Err(Rejection::NotYourTurn { to_move });
        }

        let piece = self
            .position
            .piece_at(intent.from)
            .ok_or(Rejection::EmptySquare(intent.from))?;
        if piece.color != color {
            return Err(Rejection::NotYourPiece(intent.from));
        }

        let next = self
            .rules
            .apply(&self.position, intent)
            .map_err(Rejection::Illegal)?;

        let count = self.seen.entry(next.repetition_key()).or_insert(0);
        *count = count.saturating_add(1);
        self.position = next;
        self.version += 1;

        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use rookline_rules::{Color, PieceKind, RulesError, Square, StandardRules, Terminal};

    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn intent(from: &str, to: &str) -> MoveIntent {
        MoveIntent::new(sq(from), sq(to))
    }

    fn game() -> GameState<StandardRules> {
        GameState::new(StandardRules)
    }

    #[test]
    fn test_new_game_snapshot_is_version_zero() {
        let snap = game().snapshot();
        assert_eq!(snap.version, 0);
        assert_eq!(snap.repetitions, 1);
        assert_eq!(
            snap.position,
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn test_from_fen_rejects_unloadable_position() {
        let result = GameState::from_fen(StandardRules, "garbage");
        assert!(matches!(result, Err(SessionError::InvalidStart(_))));
    }

    #[test]
    fn test_propose_accepts_white_opening_move() {
        let mut g = game();

        let snap = g.propose(Role::White, &intent("e2", "e4")).unwrap();

        assert_eq!(snap.version, 1);
        assert_eq!(g.position().side_to_move(), Color::Black);
        assert_eq!(g.position().piece_at(sq("e4")).map(|p| p.kind), Some(PieceKind::Pawn));
    }

    #[test]
    fn test_propose_rejects_wrong_turn() {
        let mut g = game();

        let err = g.propose(Role::Black, &intent("e7", "e5")).unwrap_err();

        assert_eq!(err, Rejection::NotYourTurn { to_move: Color::White });
        assert_eq!(g.version(), 0);
    }

    #[test]
    fn test_propose_rejects_spectator_regardless_of_content() {
        let mut g = game();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("a3", "a4"), ("e2", "e2")] {
            assert_eq!(
                g.propose(Role::Spectator, &intent(from, to)),
                Err(Rejection::Spectator)
            );
        }
        assert_eq!(g.version(), 0);
    }

    #[test]
    fn test_propose_rejects_empty_and_foreign_squares() {
        let mut g = game();
        assert_eq!(
            g.propose(Role::White, &intent("e4", "e5")),
            Err(Rejection::EmptySquare(sq("e4")))
        );
        assert_eq!(
            g.propose(Role::White, &intent("e7", "e5")),
            Err(Rejection::NotYourPiece(sq("e7")))
        );
    }

    #[test]
    fn test_propose_rejects_illegal_geometry() {
        let mut g = game();
        let before = g.snapshot();

        let err = g.propose(Role::White, &intent("e2", "e5")).unwrap_err();

        assert_eq!(
            err,
            Rejection::Illegal(RulesError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        assert_eq!(g.snapshot(), before);
    }

    #[test]
    fn test_propose_black_replaying_whites_move_is_rejected() {
        let mut g = game();
        g.propose(Role::White, &intent("e2", "e4")).unwrap();

        // e2 is empty now and it is Black's turn; Black cannot replay it.
        assert_eq!(
            g.propose(Role::Black, &intent("e2", "e4")),
            Err(Rejection::EmptySquare(sq("e2")))
        );
        assert_eq!(g.version(), 1);
    }

    #[test]
    fn test_propose_promotes_to_queen_without_choice() {
        let mut g = GameState::from_fen(StandardRules, "8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();

        g.propose(Role::White, &intent("e7", "e8")).unwrap();

        assert_eq!(g.position().piece_at(sq("e8")).map(|p| p.kind), Some(PieceKind::Queen));
    }

    #[test]
    fn test_propose_accepted_positions_always_load() {
        let mut g = game();
        let rules = StandardRules;
        for (from, to) in [("d2", "d4"), ("d7", "d5"), ("c1", "f4"), ("g8", "f6"), ("e2", "e3")] {
            let role = match g.position().side_to_move() {
                Color::White => Role::White,
                Color::Black => Role::Black,
            };
            let snap = g.propose(role, &intent(from, to)).unwrap();
            assert!(rules.load(&snap.position).is_ok(), "{}", snap.position);
        }
    }

    #[test]
    fn test_repetitions_count_returns_to_same_position() {
        let mut g = game();
        let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];

        for (i, (from, to)) in shuffle.iter().cycle().take(8).enumerate() {
            let role = if i % 2 == 0 { Role::White } else { Role::Black };
            g.propose(role, &intent(from, to)).unwrap();
        }

        assert_eq!(g.version(), 8);
        assert_eq!(g.repetitions(), 3);
        assert_eq!(g.assessment().terminal(), Some(Terminal::ThreefoldRepetition));
    }

    #[test]
    fn test_fools_mate_is_checkmate() {
        let mut g = game();
        g.propose(Role::White, &intent("f2", "f3")).unwrap();
        g.propose(Role::Black, &intent("e7", "e5")).unwrap();
        g.propose(Role::White, &intent("g2", "g4")).unwrap();
        g.propose(Role::Black, &intent("d8", "h4")).unwrap();

        assert_eq!(
            g.assessment().terminal(),
            Some(Terminal::Checkmate { winner: Color::Black })
        );
    }
}
