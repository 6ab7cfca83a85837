//! The authority: the one place a Rookline game is allowed to change.
//!
//! Each session runs as an actor. Connections never touch the position;
//! they send commands through a [`SessionHandle`] and receive
//! [`ServerMessage`](rookline_protocol::ServerMessage)s on their own
//! outbound channel. Because the actor processes one command at a time,
//! move intents are validated and applied strictly in arrival order and
//! every connection sees snapshots in that same order.
//!
//! ```text
//!  handler (conn 1) ──┐                     ┌──→ outbound (conn 1)
//!  handler (conn 2) ──┼──→ SessionActor ────┼──→ outbound (conn 2)
//!  handler (conn 3) ──┘   (GameState +      └──→ outbound (conn 3)
//!                          RoleRegistry)
//! ```

mod actor;
mod commands;
mod error;
mod handle;
mod state;

pub use actor::spawn_session;
pub use commands::{OutboundSender, SessionInfo};
pub use error::{Rejection, SessionError};
pub use handle::SessionHandle;
pub use state::GameState;
