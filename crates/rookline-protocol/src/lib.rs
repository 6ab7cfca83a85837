//! Wire protocol for Rookline.
//!
//! This crate defines the messages the authority and its clients exchange:
//!
//! - **Types** ([`Envelope`], [`ClientMessage`], [`ServerMessage`],
//!   [`Role`], [`Snapshot`]): what travels on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   turned into bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Session (roles, position)
//! ```
//!
//! # Ordering
//!
//! Per connection the authority always sends `role-assigned` before the
//! first `state-snapshot`, and snapshots carry a `version` that increases
//! in the order moves were accepted.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientMessage, Envelope, Role, ServerMessage, Snapshot};

/// The current protocol version. Clients must send this in their `hello`
/// or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;
