//! Admission control and role lifecycle for a Rookline session.
//!
//! The registry decides which part every connection plays:
//!
//! 1. **Assignment**: the first vacant of `White`, then `Black`, then
//!    `Spectator`. Deterministic, no negotiation.
//! 2. **Release**: a disconnecting player's color is vacated at once.
//! 3. **Reconnection**: every admission hands out a token. Within the
//!    grace period the token reclaims the old color, if nobody has taken
//!    it in the meantime.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)   ← the authority actor owns one RoleRegistry
//!     ↕
//! Registry Layer (this crate)
//!     ↕
//! Protocol / Transport (below)  ← Role, ConnectionId
//! ```
//!
//! The registry is plain data with no locking. It is owned by the session
//! actor, which serializes every call.

mod error;
mod registry;
mod seat;

pub use error::RegistryError;
pub use registry::{Admission, RoleRegistry};
pub use seat::{RegistryConfig, Seat, SeatState};
