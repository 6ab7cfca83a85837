//! Cloneable handle to a running session actor.

use rookline_protocol::Role;
use rookline_registry::Admission;
use rookline_rules::MoveIntent;
use rookline_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::commands::{OutboundSender, SessionCommand, SessionInfo};
use crate::SessionError;

/// Talks to the session actor over its command channel. Cheap to clone;
/// every connection handler holds one.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(sender: mpsc::Sender<SessionCommand>) -> Self {
        Self { sender }
    }

    /// Admits `conn_id`, trying `reconnect_token` first.
    ///
    /// Before this returns, the actor has queued `role-assigned` followed by
    /// the current `state-snapshot` on `outbound`.
    pub async fn connect(
        &self,
        conn_id: ConnectionId,
        reconnect_token: Option<String>,
        outbound: OutboundSender,
    ) -> Result<Admission, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Connect {
            conn_id,
            reconnect_token,
            outbound,
            reply,
        })
        .await?;
        rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Releases `conn_id` and returns the role it held.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> Result<Role, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Disconnect { conn_id, reply })
            .await?;
        rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Submits a move intent. The verdict arrives on the connection's
    /// outbound channel: a broadcast `state-snapshot` or a `move-rejected`.
    pub async fn propose(
        &self,
        conn_id: ConnectionId,
        intent: MoveIntent,
    ) -> Result<(), SessionError> {
        self.send(SessionCommand::Move { conn_id, intent }).await
    }

    /// Asks for the current snapshot to be sent to `conn_id` only.
    pub async fn request_snapshot(&self, conn_id: ConnectionId) -> Result<(), SessionError> {
        self.send(SessionCommand::RequestSnapshot { conn_id }).await
    }

    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::GetInfo { reply }).await?;
        rx.await.map_err(|_| SessionError::Unavailable)
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable)
    }
}
