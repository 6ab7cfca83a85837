//! The session actor: owns the game and the registry, runs on its own task.

use std::collections::HashMap;

use rookline_protocol::{Role, ServerMessage};
use rookline_registry::{Admission, RegistryConfig, RoleRegistry};
use rookline_rules::{MoveIntent, RulesEngine};
use rookline_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::commands::{OutboundSender, SessionCommand, SessionInfo};
use crate::{GameState, SessionError, SessionHandle};

struct SessionActor<R> {
    game: GameState<R>,
    registry: RoleRegistry,
    outbound: HashMap<ConnectionId, OutboundSender>,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<R: RulesEngine> SessionActor<R> {
    async fn run(mut self) {
        tracing::info!(version = self.game.version(), "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Connect {
                    conn_id,
                    reconnect_token,
                    outbound,
                    reply,
                } => {
                    let result = self.handle_connect(conn_id, reconnect_token.as_deref(), outbound);
                    let _ = reply.send(result);
                }
                SessionCommand::Disconnect { conn_id, reply } => {
                    let result = self.handle_disconnect(conn_id);
                    let _ = reply.send(result);
                }
                SessionCommand::Move { conn_id, intent } => {
                    self.handle_move(conn_id, &intent);
                }
                SessionCommand::RequestSnapshot { conn_id } => {
                    self.send_to(conn_id, ServerMessage::StateSnapshot(self.game.snapshot()));
                }
                SessionCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!("session shutting down");
                    break;
                }
            }
        }

        tracing::info!(version = self.game.version(), "session actor stopped");
    }

    fn handle_connect(
        &mut self,
        conn_id: ConnectionId,
        reconnect_token: Option<&str>,
        outbound: OutboundSender,
    ) -> Result<Admission, SessionError> {
        let admission = self.registry.admit(conn_id, reconnect_token)?;

        // Dropping the displaced sender ends that connection's handler.
        if let Some(old) = admission.displaced {
            if let Some(sender) = self.outbound.remove(&old) {
                let _ = sender.send(ServerMessage::Error {
                    code: 409,
                    message: format!("{} seat taken over by a reconnecting client", admission.role),
                });
            }
            tracing::info!(%conn_id, displaced = %old, role = %admission.role, "seat taken over");
        }

        // Queued before any broadcast can reach this connection, so
        // `role-assigned` always precedes the first snapshot.
        let _ = outbound.send(ServerMessage::RoleAssigned {
            role: admission.role,
            reconnect_token: admission.token.clone(),
        });
        let _ = outbound.send(ServerMessage::StateSnapshot(self.game.snapshot()));
        self.outbound.insert(conn_id, outbound);

        tracing::info!(
            %conn_id,
            role = %admission.role,
            reclaimed = admission.reclaimed,
            connections = self.outbound.len(),
            "connection admitted"
        );
        Ok(admission)
    }

    fn handle_disconnect(&mut self, conn_id: ConnectionId) -> Result<Role, SessionError> {
        self.outbound.remove(&conn_id);
        let role = self.registry.disconnect(conn_id)?;
        tracing::info!(%conn_id, %role, connections = self.outbound.len(), "connection left");
        Ok(role)
    }

    fn handle_move(&mut self, conn_id: ConnectionId, intent: &MoveIntent) {
        let Some(role) = self.registry.role_of(conn_id) else {
            tracing::warn!(%conn_id, %intent, "move from unknown connection, ignoring");
            return;
        };

        match self.game.propose(role, intent) {
            Ok(snapshot) => {
                tracing::info!(%conn_id, %role, %intent, version = snapshot.version, "move accepted");
                if let Some(terminal) = self.game.assessment().terminal() {
                    tracing::info!(version = snapshot.version, %terminal, "game over");
                }
                self.broadcast(ServerMessage::StateSnapshot(snapshot));
            }
            Err(rejection) => {
                tracing::debug!(%conn_id, %role, %intent, reason = %rejection, "move rejected");
                self.send_to(
                    conn_id,
                    ServerMessage::MoveRejected {
                        reason: rejection.to_string(),
                    },
                );
            }
        }
    }

    fn broadcast(&self, msg: ServerMessage) {
        for sender in self.outbound.values() {
            let _ = sender.send(msg.clone());
        }
    }

    fn send_to(&self, conn_id: ConnectionId, msg: ServerMessage) {
        if let Some(sender) = self.outbound.get(&conn_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            version: self.game.version(),
            position: self.game.position().to_fen(),
            white: self.registry.white(),
            black: self.registry.black(),
            spectators: self.registry.spectators().len(),
            connections: self.registry.len(),
            terminal: self.game.assessment().terminal(),
        }
    }
}

/// Spawns the actor for `game` on the Tokio runtime and returns its handle.
///
/// The actor stops on [`SessionHandle::shutdown`] or once every handle has
/// been dropped.
pub fn spawn_session<R: RulesEngine>(
    game: GameState<R>,
    config: RegistryConfig,
    channel_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = SessionActor {
        game,
        registry: RoleRegistry::new(config),
        outbound: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    SessionHandle::new(tx)
}
