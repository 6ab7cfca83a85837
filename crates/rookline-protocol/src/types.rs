//! Core protocol types for Rookline's wire format.
//!
//! Every frame is an [`Envelope`] whose payload is a [`ClientMessage`]
//! (client → authority) or a [`ServerMessage`] (authority → client).
//! Message tags are kebab-case (`"move-intent"`, `"state-snapshot"`), the
//! shape browser clients already speak.

use std::fmt;

use rookline_rules::{Color, MoveIntent};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The part a connection plays in a session.
///
/// On the wire a role is the color it moves (`"w"` / `"b"`) or `null` for
/// spectators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<Color>", into = "Option<Color>")]
pub enum Role {
    White,
    Black,
    Spectator,
}

impl Role {
    /// The color this role may move, or `None` for spectators.
    pub fn color(self) -> Option<Color> {
        match self {
            Self::White => Some(Color::White),
            Self::Black => Some(Color::Black),
            Self::Spectator => None,
        }
    }

    pub fn is_player(self) -> bool {
        !matches!(self, Self::Spectator)
    }
}

impl From<Option<Color>> for Role {
    fn from(color: Option<Color>) -> Self {
        match color {
            Some(Color::White) => Self::White,
            Some(Color::Black) => Self::Black,
            None => Self::Spectator,
        }
    }
}

impl From<Role> for Option<Color> {
    fn from(role: Role) -> Self {
        role.color()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::White => f.write_str("white"),
            Self::Black => f.write_str("black"),
            Self::Spectator => f.write_str("spectator"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A full (never incremental) encoding of the canonical position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The position as FEN.
    pub position: String,

    /// Number of moves the authority has accepted so far. Strictly
    /// increasing in acceptance order, so clients can discard anything
    /// older than what they already hold.
    pub version: u64,

    /// How many times this exact position has occurred in the game,
    /// including now. FEN cannot express this and threefold repetition
    /// depends on it.
    pub repetitions: u8,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Messages a client sends to the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// First frame on every connection. `reconnect_token` is the token
    /// from a previous `role-assigned`, if the client is coming back.
    Hello {
        version: u32,
        #[serde(default)]
        reconnect_token: Option<String>,
    },

    /// A drag-drop gesture, unvalidated.
    MoveIntent(MoveIntent),

    /// Asks for the current snapshot again, e.g. after failing to load one.
    SnapshotRequest,

    /// The client is leaving.
    Disconnect { reason: String },
}

/// Messages the authority sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Sent once per connection, immediately after admission.
    RoleAssigned {
        role: Role,
        reconnect_token: String,
    },

    /// The canonical position. Sent after `role-assigned`, after every
    /// accepted move (to every connection), and on `snapshot-request`.
    StateSnapshot(Snapshot),

    /// The originating client's move intent was refused. Never broadcast.
    MoveRejected { reason: String },

    /// A protocol-level failure. `code` follows HTTP conventions
    /// (400 bad request, 503 unavailable).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Envelope: the top-level wire format
// ---------------------------------------------------------------------------

/// The top-level frame. Every message on the wire is an `Envelope`.
///
/// ```text
/// ┌──────────────────────────────────────┐
/// │ seq: 42                              │  ← per-direction counter
/// │ timestamp: 15000                     │  ← ms since the sender started
/// │ payload: { "type": "move-intent", …} │
/// └──────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<P> {
    /// Auto-incrementing sequence number. Each side keeps its own counter.
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    pub timestamp: u64,

    /// The message itself.
    pub payload: P,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The JSON shapes below are what browser clients parse; a change here
    //! is a wire break.

    use rookline_rules::{PieceKind, Square};

    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    // =====================================================================
    // Role
    // =====================================================================

    #[test]
    fn test_role_serializes_as_color_or_null() {
        assert_eq!(serde_json::to_string(&Role::White).unwrap(), "\"w\"");
        assert_eq!(serde_json::to_string(&Role::Black).unwrap(), "\"b\"");
        assert_eq!(serde_json::to_string(&Role::Spectator).unwrap(), "null");
    }

    #[test]
    fn test_role_deserializes_from_color_or_null() {
        assert_eq!(serde_json::from_str::<Role>("\"w\"").unwrap(), Role::White);
        assert_eq!(serde_json::from_str::<Role>("null").unwrap(), Role::Spectator);
    }

    #[test]
    fn test_role_color() {
        assert_eq!(Role::White.color(), Some(Color::White));
        assert_eq!(Role::Black.color(), Some(Color::Black));
        assert_eq!(Role::Spectator.color(), None);
        assert!(!Role::Spectator.is_player());
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_move_intent_json_format() {
        let msg = ClientMessage::MoveIntent(
            MoveIntent::new(sq("e2"), sq("e4")).with_promotion(PieceKind::Queen),
        );
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "move-intent");
        assert_eq!(json["from"], "e2");
        assert_eq!(json["to"], "e4");
        assert_eq!(json["promotion"], "q");
    }

    #[test]
    fn test_move_intent_parses_browser_payload() {
        let raw = r#"{"type":"move-intent","from":"g1","to":"f3","promotion":"q"}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MoveIntent(
                MoveIntent::new(sq("g1"), sq("f3")).with_promotion(PieceKind::Queen)
            )
        );
    }

    #[test]
    fn test_move_intent_with_bad_square_fails_to_decode() {
        let raw = r#"{"type":"move-intent","from":"e9","to":"e4"}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());

        let missing = r#"{"type":"move-intent","from":"e2"}"#;
        assert!(serde_json::from_str::<ClientMessage>(missing).is_err());
    }

    #[test]
    fn test_hello_token_is_optional() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"hello","version":1}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Hello {
                version: 1,
                reconnect_token: None
            }
        );
    }

    #[test]
    fn test_snapshot_request_json_format() {
        let json = serde_json::to_value(ClientMessage::SnapshotRequest).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "snapshot-request" }));
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_role_assigned_json_format() {
        let msg = ServerMessage::RoleAssigned {
            role: Role::Spectator,
            reconnect_token: "abc".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "role-assigned");
        assert!(json["role"].is_null());
        assert_eq!(json["reconnect_token"], "abc");
    }

    #[test]
    fn test_state_snapshot_json_format() {
        let msg = ServerMessage::StateSnapshot(Snapshot {
            position: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            version: 7,
            repetitions: 1,
        });
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "state-snapshot");
        assert_eq!(json["position"], "8/8/8/8/8/8/8/8 w - - 0 1");
        assert_eq!(json["version"], 7);
        assert_eq!(json["repetitions"], 1);
    }

    #[test]
    fn test_move_rejected_json_format() {
        let msg = ServerMessage::MoveRejected {
            reason: "illegal move e2e5".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "move-rejected");
        assert_eq!(json["reason"], "illegal move e2e5");
    }

    #[test]
    fn test_unknown_message_type_fails_to_decode() {
        let unknown = r#"{"type": "fly-to-moon", "speed": 9000}"#;
        assert!(serde_json::from_str::<ServerMessage>(unknown).is_err());
        assert!(serde_json::from_str::<ClientMessage>(unknown).is_err());
    }

    // =====================================================================
    // Envelope
    // =====================================================================

    #[test]
    fn test_envelope_json_format() {
        let envelope = Envelope {
            seq: 42,
            timestamp: 15000,
            payload: ServerMessage::Error {
                code: 400,
                message: "bad".into(),
            },
        };
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["seq"], 42);
        assert_eq!(json["timestamp"], 15000);
        assert_eq!(json["payload"]["type"], "error");
        assert_eq!(json["payload"]["code"], 400);
    }

    #[test]
    fn test_envelope_missing_payload_fails() {
        let wrong = r#"{"seq": 1, "timestamp": 0}"#;
        assert!(serde_json::from_str::<Envelope<ClientMessage>>(wrong).is_err());
    }
}
