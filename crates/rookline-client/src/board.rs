//! What a renderer draws, and what it reports back.

use rookline_protocol::Role;
use rookline_rules::{Grid, Piece, Square};

/// A cell on the rendered board. Row 0 is the top (rank 8), column 0 is
/// the a-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub row: usize,
    pub col: usize,
}

impl GridCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The square this cell shows, or `None` if it is off the board.
    pub fn square(self) -> Option<Square> {
        Square::from_grid(self.row, self.col)
    }
}

impl From<Square> for GridCoord {
    fn from(square: Square) -> Self {
        let (row, col) = square.to_grid();
        Self { row, col }
    }
}

/// A completed drag-drop gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragDrop {
    pub source: GridCoord,
    pub target: GridCoord,
}

/// A read-only picture of the board for one viewer.
///
/// Built entirely from the last snapshot and the viewer's role, so the
/// same snapshot always yields the same view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub grid: Grid,
    pub role: Role,
    pub version: u64,
}

impl BoardView {
    pub fn piece(&self, at: GridCoord) -> Option<Piece> {
        self.grid.get(at.row)?.get(at.col).copied().flatten()
    }

    /// A piece is draggable only by the viewer whose role is its color.
    /// Spectators can drag nothing.
    pub fn is_draggable(&self, at: GridCoord) -> bool {
        match (self.piece(at), self.role.color()) {
            (Some(piece), Some(color)) => piece.color == color,
            _ => false,
        }
    }
}
