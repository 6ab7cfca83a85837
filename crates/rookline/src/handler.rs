//! Per-connection handler: handshake, admission, and message routing.
//!
//! Each accepted peer gets its own Tokio task running this handler:
//!   0. Complete the WebSocket upgrade
//!   1. Receive `hello` → validate the protocol version
//!   2. Admit the connection to the session → `role-assigned` + snapshot
//!   3. Loop: forward the session's outbound messages to the socket and
//!      route inbound frames to the session
//!
//! Steps 0 and 1 are each bounded by the handshake timeout.

use std::sync::Arc;
use std::time::Instant;

use rookline_protocol::{
    ClientMessage, Codec, Envelope, PROTOCOL_VERSION, ProtocolError, ServerMessage,
};
use rookline_session::SessionHandle;
use rookline_transport::{
    Connection, ConnectionId, Incoming, PendingWebSocket, TransportError, WebSocketConnection,
};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::RooklineError;
use crate::server::ServerState;

/// Releases the connection's role when the handler exits, however it exits.
///
/// `Drop` is synchronous, so the disconnect is sent from a spawned task.
struct ConnectionGuard {
    conn_id: ConnectionId,
    session: SessionHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let session = self.session.clone();
        tokio::spawn(async move {
            if let Err(e) = session.disconnect(conn_id).await {
                tracing::debug!(%conn_id, error = %e, "disconnect after close failed");
            }
        });
    }
}

/// Outgoing frame state for one connection.
struct Outgoing {
    seq: u64,
    start: Instant,
}

impl Outgoing {
    fn new() -> Self {
        Self {
            seq: 1,
            start: Instant::now(),
        }
    }

    fn envelope(&mut self, payload: ServerMessage) -> Envelope<ServerMessage> {
        let seq = self.seq;
        self.seq += 1;
        Envelope {
            seq,
            timestamp: self.start.elapsed().as_millis() as u64,
            payload,
        }
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    incoming: PendingWebSocket,
    state: Arc<ServerState>,
) -> Result<(), RooklineError> {
    let peer = incoming.peer_addr();
    let conn = tokio::time::timeout(state.handshake_timeout, incoming.establish())
        .await
        .map_err(|_| TransportError::HandshakeTimedOut)??;
    let conn_id = conn.id();
    let mut out = Outgoing::new();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    // --- Step 1: Handshake ---
    let reconnect_token = match perform_handshake(&conn, &state, &mut out).await {
        Ok(token) => token,
        Err(e) => {
            let _ = conn.close().await;
            return Err(e);
        }
    };

    // --- Step 2: Admission ---
    let (tx, mut outbound) = mpsc::unbounded_channel();
    let admission = state.session.connect(conn_id, reconnect_token, tx).await?;
    let _guard = ConnectionGuard {
        conn_id,
        session: state.session.clone(),
    };
    tracing::info!(%conn_id, role = %admission.role, "connection joined session");

    // --- Step 3: Message loop ---
    loop {
        tokio::select! {
            msg = outbound.recv() => match msg {
                Some(msg) => send(&conn, &state.codec, &mut out, msg).await?,
                None => {
                    tracing::info!(%conn_id, "released by the session, dropping connection");
                    break;
                }
            },
            data = conn.recv() => match data {
                Ok(Some(data)) => {
                    if !handle_frame(&conn, &state, &mut out, conn_id, &data).await? {
                        break;
                    }
                }
                Ok(None) => {
                    tracing::info!(%conn_id, "connection closed cleanly");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "recv error");
                    break;
                }
            },
        }
    }

    let _ = conn.close().await;
    // _guard drops here → the session releases the role.
    Ok(())
}

/// Waits for `hello` and checks its version. Returns the reconnection token
/// the client presented, if any.
async fn perform_handshake(
    conn: &WebSocketConnection,
    state: &ServerState,
    out: &mut Outgoing,
) -> Result<Option<String>, RooklineError> {
    let data = match tokio::time::timeout(state.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before hello".into()).into());
        }
        Ok(Err(e)) => return Err(RooklineError::Transport(e)),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let payload = state
        .codec
        .decode::<Envelope<ClientMessage>>(&data)
        .map(|envelope| envelope.payload);

    match payload {
        Ok(ClientMessage::Hello {
            version,
            reconnect_token,
        }) if version == PROTOCOL_VERSION => Ok(reconnect_token),
        Ok(ClientMessage::Hello { version, .. }) => {
            let message = format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}");
            send_error(conn, state, out, 400, &message).await?;
            Err(ProtocolError::InvalidMessage("protocol version mismatch".into()).into())
        }
        _ => {
            send_error(conn, state, out, 400, "expected hello").await?;
            Err(ProtocolError::InvalidMessage("first message must be hello".into()).into())
        }
    }
}

/// Just enough of an envelope to tell what kind of message a frame was
/// meant to be when it fails to decode in full.
#[derive(Deserialize)]
struct Probe {
    payload: ProbePayload,
}

#[derive(Deserialize)]
struct ProbePayload {
    #[serde(rename = "type")]
    kind: String,
}

/// Routes one inbound frame. Returns `false` if the connection should close.
async fn handle_frame(
    conn: &WebSocketConnection,
    state: &ServerState,
    out: &mut Outgoing,
    conn_id: ConnectionId,
    data: &[u8],
) -> Result<bool, RooklineError> {
    let envelope: Envelope<ClientMessage> = match state.codec.decode(data) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
            let is_intent = state
                .codec
                .decode::<Probe>(data)
                .is_ok_and(|probe| probe.payload.kind == "move-intent");
            let reply = if is_intent {
                ServerMessage::MoveRejected {
                    reason: format!("malformed move intent: {e}"),
                }
            } else {
                ServerMessage::Error {
                    code: 400,
                    message: e.to_string(),
                }
            };
            send(conn, &state.codec, out, reply).await?;
            return Ok(true);
        }
    };

    match envelope.payload {
        ClientMessage::MoveIntent(intent) => {
            state.session.propose(conn_id, intent).await?;
        }
        ClientMessage::SnapshotRequest => {
            state.session.request_snapshot(conn_id).await?;
        }
        ClientMessage::Disconnect { reason } => {
            tracing::info!(%conn_id, %reason, "client disconnecting");
            return Ok(false);
        }
        ClientMessage::Hello { .. } => {
            send_error(conn, state, out, 400, "hello already received").await?;
        }
    }
    Ok(true)
}

async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    out: &mut Outgoing,
    msg: ServerMessage,
) -> Result<(), RooklineError> {
    let bytes = codec.encode(&out.envelope(msg))?;
    conn.send(&bytes).await?;
    Ok(())
}

async fn send_error(
    conn: &WebSocketConnection,
    state: &ServerState,
    out: &mut Outgoing,
    code: u16,
    message: &str,
) -> Result<(), RooklineError> {
    let msg = ServerMessage::Error {
        code,
        message: message.to_string(),
    };
    send(conn, &state.codec, out, msg).await
}
