//! The `RulesEngine` seam and its `cozy-chess` implementation.

use cozy_chess::{BitBoard, Board, File, GameStatus, Move, Piece};

use crate::assessment::REPETITION_LIMIT;
use crate::{Assessment, MoveIntent, PieceKind, Position, RulesError, Square};

/// Pure chess rules, consulted by the authority and by every client.
///
/// Implementations must be deterministic: the authority and clients run
/// their own instances and have to agree on every classification.
pub trait RulesEngine: Send + Sync + 'static {
    /// Loads an encoded position, failing if it is not a legal position.
    fn load(&self, encoding: &str) -> Result<Position, RulesError>;

    /// Applies a move intent, returning the resulting position.
    ///
    /// A pawn reaching its last rank promotes to `intent.promotion`, or to
    /// a queen when the intent names none. The promotion field is ignored
    /// for every other move.
    fn apply(&self, position: &Position, intent: &MoveIntent) -> Result<Position, RulesError>;

    /// Classifies `position`. `repetitions` is how many times this exact
    /// position has occurred in the game, including now.
    fn assess(&self, position: &Position, repetitions: u8) -> Assessment;
}

/// Standard chess rules backed by `cozy-chess`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RulesEngine for StandardRules {
    fn load(&self, encoding: &str) -> Result<Position, RulesError> {
        Position::from_fen(encoding)
    }

    fn apply(&self, position: &Position, intent: &MoveIntent) -> Result<Position, RulesError> {
        let board = position.board();
        let illegal = || RulesError::IllegalMove {
            from: intent.from,
            to: intent.to,
        };

        let from = intent.from.to_cozy();
        let piece = board.piece_on(from).ok_or_else(illegal)?;
        let mover = position.side_to_move();

        let promotion = (piece == Piece::Pawn && intent.to.rank() == mover.promotion_rank())
            .then(|| intent.promotion.unwrap_or(PieceKind::Queen).into());

        let mut mv = Move {
            from,
            to: intent.to.to_cozy(),
            promotion,
        };
        if piece == Piece::King {
            mv = castling_move(board, mv);
        }

        if !board.is_legal(mv) {
            return Err(illegal());
        }

        let mut next = board.clone();
        next.play_unchecked(mv);
        Ok(Position::from_board(next))
    }

    fn assess(&self, position: &Position, repetitions: u8) -> Assessment {
        let board = position.board();
        let has_moves = board.generate_moves(|moves| !moves.is_empty());
        let in_check = !board.checkers().is_empty();

        let checkmate = (!has_moves && in_check).then(|| position.side_to_move().opponent());
        let stalemate = !has_moves && !in_check;

        Assessment {
            checkmate,
            stalemate,
            threefold_repetition: checkmate.is_none() && repetitions >= REPETITION_LIMIT,
            insufficient_material: checkmate.is_none() && insufficient_material(board),
            fifty_move_rule: checkmate.is_none() && board.status() == GameStatus::Drawn && has_moves,
        }
    }
}

/// Maps a two-file king step (`e1g1`) onto the king-takes-rook encoding
/// `cozy-chess` uses for castling (`e1h1`). Other moves pass through.
fn castling_move(board: &Board, mv: Move) -> Move {
    let from = Square::from_cozy(mv.from);
    let to = Square::from_cozy(mv.to);
    if from.rank() != to.rank() || from.file() != File::E as u8 {
        return mv;
    }
    let rook_file = match to.file() {
        f if f == File::G as u8 => File::H,
        f if f == File::C as u8 => File::A,
        _ => return mv,
    };
    let castle = Move {
        from: mv.from,
        to: cozy_chess::Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };
    if board.is_legal(castle) { castle } else { mv }
}

/// Neither side can mate: bare kings, a single minor piece, or only
/// bishops all standing on squares of one color.
fn insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    if (knights | bishops).len() <= 1 {
        return true;
    }
    knights.is_empty() && bishops_share_color(bishops)
}

fn bishops_share_color(bishops: BitBoard) -> bool {
    let mut shades = bishops
        .into_iter()
        .map(|sq| (sq.file() as u8 + sq.rank() as u8) % 2);
    match shades.next() {
        Some(first) => shades.all(|shade| shade == first),
        None => true,
    }
}
