//! Commands sent to the session actor and the data it reports back.

use rookline_protocol::{Role, ServerMessage};
use rookline_registry::Admission;
use rookline_rules::{MoveIntent, Terminal};
use rookline_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::SessionError;

/// Channel the actor uses to push messages to one connection.
///
/// Unbounded so the actor never waits on a slow client. Messages queue in
/// the order the actor produced them.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands processed by the session actor. Requests that need an answer
/// carry a oneshot reply.
pub(crate) enum SessionCommand {
    Connect {
        conn_id: ConnectionId,
        reconnect_token: Option<String>,
        outbound: OutboundSender,
        reply: oneshot::Sender<Result<Admission, SessionError>>,
    },

    Disconnect {
        conn_id: ConnectionId,
        reply: oneshot::Sender<Result<Role, SessionError>>,
    },

    /// Fire-and-forget: the outcome reaches the client through its
    /// outbound channel.
    Move {
        conn_id: ConnectionId,
        intent: MoveIntent,
    },

    RequestSnapshot {
        conn_id: ConnectionId,
    },

    GetInfo {
        reply: oneshot::Sender<SessionInfo>,
    },

    Shutdown,
}

/// A point-in-time summary of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub version: u64,
    /// The canonical position as FEN.
    pub position: String,
    pub white: Option<ConnectionId>,
    pub black: Option<ConnectionId>,
    pub spectators: usize,
    pub connections: usize,
    /// How the game ended, if it has.
    pub terminal: Option<Terminal>,
}
