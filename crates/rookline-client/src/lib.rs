//! The client half of Rookline.
//!
//! A client is a reactive renderer plus an intent emitter. It never
//! changes the position itself. It renders whatever snapshot the authority
//! sent last, and turns drag-drop gestures into move intents.
//!
//! - [`Client`] is the pure state machine: feed it [`ServerMessage`]s, get
//!   back [`ClientEvent`]s to carry out.
//! - [`Renderer`] is the presentation seam: draw a [`BoardView`], show a
//!   [`Notice`].
//! - [`ClientConnection`] and [`run_client`] drive one WebSocket connection
//!   cooperatively on a single task.
//!
//! [`ServerMessage`]: rookline_protocol::ServerMessage

mod board;
mod connection;
mod error;
mod notice;
mod render;
mod state;

pub use board::{BoardView, DragDrop, GridCoord};
pub use connection::{ClientConnection, run_client};
pub use error::ClientError;
pub use notice::{NOTICE_TTL, Notice, NoticeKind};
pub use render::Renderer;
pub use state::{Client, ClientEvent, ClientState};
