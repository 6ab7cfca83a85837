//! The client state machine.
//!
//! ```text
//!   Uninitialized ──(role-assigned)──→ RoleKnown ──(state-snapshot)──→ Interactive
//!                                                                        │   ↑
//!                                                                        └───┘
//!                                                                   (state-snapshot)
//! ```

use rookline_protocol::{ClientMessage, Role, ServerMessage, Snapshot};
use rookline_rules::{MoveIntent, PieceKind, Position, RulesEngine};

use crate::{BoardView, GridCoord, Notice, NoticeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No role, no position.
    Uninitialized,
    /// Role known, still waiting for the first snapshot.
    RoleKnown,
    /// Rendering the latest snapshot and accepting gestures.
    Interactive,
}

/// Something the host has to carry out after [`Client::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Render(BoardView),
    Notice(Notice),
    Outgoing(ClientMessage),
}

/// Per-connection client logic.
///
/// The client holds a read-only copy of the last position it was sent. It
/// never applies a move locally: an intent goes to the authority and the
/// board only changes when the resulting snapshot comes back.
pub struct Client<R> {
    rules: R,
    state: ClientState,
    role: Option<Role>,
    reconnect_token: Option<String>,
    position: Option<Position>,
    version: Option<u64>,
    /// Version whose terminal classification has already been announced.
    announced: Option<u64>,
}

impl<R: RulesEngine> Client<R> {
    pub fn new(rules: R) -> Self {
        Self {
            rules,
            state: ClientState::Uninitialized,
            role: None,
            reconnect_token: None,
            position: None,
            version: None,
            announced: None,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Token from the last `role-assigned`, for reconnecting later.
    pub fn reconnect_token(&self) -> Option<&str> {
        self.reconnect_token.as_deref()
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// The board as it should currently be drawn, once interactive.
    pub fn view(&self) -> Option<BoardView> {
        let position = self.position.as_ref()?;
        Some(BoardView {
            grid: position.grid(),
            role: self.role?,
            version: self.version?,
        })
    }

    /// Feeds one message from the authority through the state machine.
    pub fn handle(&mut self, msg: ServerMessage) -> Vec<ClientEvent> {
        match msg {
            ServerMessage::RoleAssigned {
                role,
                reconnect_token,
            } => self.on_role_assigned(role, reconnect_token),
            ServerMessage::StateSnapshot(snapshot) => self.on_snapshot(snapshot),
            ServerMessage::MoveRejected { reason } => {
                tracing::debug!(%reason, "move rejected");
                vec![ClientEvent::Notice(Notice::new(
                    NoticeKind::Rejected,
                    format!("Invalid move! {reason}"),
                ))]
            }
            ServerMessage::Error { code, message } => {
                tracing::warn!(code, %message, "server error");
                vec![ClientEvent::Notice(Notice::new(
                    NoticeKind::Error,
                    format!("Server error {code}: {message}"),
                ))]
            }
        }
    }

    /// Whether the piece drawn at `at` may be picked up.
    pub fn can_drag(&self, at: GridCoord) -> bool {
        self.state == ClientState::Interactive
            && self.view().is_some_and(|view| view.is_draggable(at))
    }

    /// Turns a finished drag-drop into a move intent.
    ///
    /// Returns `None` when the source piece is not draggable by this
    /// client. There is no legality check here; the promotion is always
    /// a queen and the authority decides whether it applies.
    pub fn drop_piece(&self, source: GridCoord, target: GridCoord) -> Option<ClientMessage> {
        if !self.can_drag(source) {
            return None;
        }
        let intent = MoveIntent::new(source.square()?, target.square()?)
            .with_promotion(PieceKind::Queen);
        Some(ClientMessage::MoveIntent(intent))
    }

    fn on_role_assigned(&mut self, role: Role, token: String) -> Vec<ClientEvent> {
        tracing::info!(%role, "role assigned");
        self.role = Some(role);
        self.reconnect_token = Some(token);

        match self.state {
            ClientState::Uninitialized => {
                self.state = ClientState::RoleKnown;
                Vec::new()
            }
            ClientState::RoleKnown => Vec::new(),
            // Draggability depends on the role, so redraw.
            ClientState::Interactive => self.view().map(ClientEvent::Render).into_iter().collect(),
        }
    }

    fn on_snapshot(&mut self, snapshot: Snapshot) -> Vec<ClientEvent> {
        if self.state == ClientState::Uninitialized {
            tracing::warn!(version = snapshot.version, "snapshot before role-assigned, dropping");
            return Vec::new();
        }
        if self.version.is_some_and(|held| snapshot.version < held) {
            tracing::debug!(version = snapshot.version, "stale snapshot, dropping");
            return Vec::new();
        }

        let position = match self.rules.load(&snapshot.position) {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(version = snapshot.version, error = %e, "snapshot failed to load");
                return vec![
                    ClientEvent::Notice(Notice::new(
                        NoticeKind::Desync,
                        "Board out of sync, reloading.",
                    )),
                    ClientEvent::Outgoing(ClientMessage::SnapshotRequest),
                ];
            }
        };

        let assessment = self.rules.assess(&position, snapshot.repetitions);
        self.position = Some(position);
        self.version = Some(snapshot.version);
        self.state = ClientState::Interactive;

        let mut events: Vec<ClientEvent> = self.view().map(ClientEvent::Render).into_iter().collect();

        if self.announced != Some(snapshot.version) {
            if let Some(terminal) = assessment.terminal() {
                self.announced = Some(snapshot.version);
                events.push(ClientEvent::Notice(Notice::new(
                    NoticeKind::Terminal,
                    terminal.message(),
                )));
            }
        }
        events
    }
}
