//! The presentation seam.

use crate::{BoardView, Notice};

/// Draws boards and shows notices. Implemented by whatever front end hosts
/// the client: a terminal UI, a GUI, or a recorder in tests.
///
/// Gestures flow the other way, as [`DragDrop`](crate::DragDrop) values fed
/// to [`run_client`](crate::run_client).
pub trait Renderer {
    fn render(&mut self, view: &BoardView);

    fn notice(&mut self, notice: &Notice);
}
