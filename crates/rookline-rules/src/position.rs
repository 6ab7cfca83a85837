//! `Position`: a full, legal board state.

use std::fmt;

use cozy_chess::Board;

use crate::{Color, Piece, RulesError, Square};

/// An 8×8 grid in renderer order: row 0 is rank 8, column 0 is the a-file.
pub type Grid = [[Option<Piece>; 8]; 8];

/// A legal, reachable chess position.
///
/// Piece placement, side to move, castling rights, en-passant target and
/// the move counters all round-trip through [`Position::to_fen`]. Positions
/// are only produced by the rules engine (`load`/`apply`) or
/// [`Position::initial`], so every value satisfies the engine's grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
}

impl Position {
    /// The standard starting position.
    pub fn initial() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub(crate) fn from_fen(fen: &str) -> Result<Self, RulesError> {
        if fen.split_whitespace().next().is_none() {
            return Err(RulesError::InvalidPosition("empty encoding".into()));
        }
        let board = fen
            .parse::<Board>()
            .map_err(|e| RulesError::InvalidPosition(format!("{e:?}")))?;
        Ok(Self { board })
    }

    pub(crate) fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    /// Serializes the position as FEN.
    pub fn to_fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move().into()
    }

    /// Returns the piece on `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let sq = square.to_cozy();
        let kind = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some(Piece {
            kind: kind.into(),
            color: color.into(),
        })
    }

    /// The board as a grid in renderer order.
    pub fn grid(&self) -> Grid {
        let mut grid: Grid = [[None; 8]; 8];
        for sq in self.board.occupied() {
            let square = Square::from_cozy(sq);
            let (row, col) = square.to_grid();
            grid[row][col] = self.piece_at(square);
        }
        grid
    }

    /// A key identifying the position for repetition counting.
    ///
    /// Covers placement, side to move, castling rights and en-passant
    /// target, but not the move counters.
    pub fn repetition_key(&self) -> u64 {
        self.board.hash()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}
