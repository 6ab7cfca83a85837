//! Seats: what the registry remembers about an admission after the
//! connection behind it is gone.
//!
//! Every admission creates a seat keyed by its reconnection token. The seat
//! outlives the connection for the grace period so a returning client can
//! present the token and ask for its old role back.

use std::time::{Duration, Instant};

use rookline_protocol::Role;
use rookline_transport::ConnectionId;

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Configuration for role assignment and reconnection.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long (in seconds) a vacated seat can be reclaimed with its token.
    ///
    /// Default: 30 seconds. With 0 a seat expires the moment it is vacated.
    pub reconnect_grace_secs: u64,
}

impl RegistryConfig {
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.reconnect_grace_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reconnect_grace_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SeatState
// ---------------------------------------------------------------------------

/// Lifecycle of a seat.
///
/// ```text
///   Held ──(disconnect)──→ Vacated ──(grace elapsed)──→ Expired
///    ↑ │                      │
///    │ └──(reconnect while    │
///    │     still held)        │
///    └──────(reconnect)───────┘
/// ```
///
/// The role a seat names is released as soon as the seat leaves `Held`.
/// `Vacated` only means the token may still ask for it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatState {
    Held(ConnectionId),
    Vacated { since: Instant },
    Expired,
}

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Seat {
    pub role: Role,
    pub state: SeatState,
    pub token: String,
}

impl Seat {
    /// Whether a vacated seat has outlived `grace`.
    pub(crate) fn is_stale(&self, grace: Duration) -> bool {
        match self.state {
            SeatState::Vacated { since } => since.elapsed() >= grace,
            _ => false,
        }
    }
}
