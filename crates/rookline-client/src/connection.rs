//! WebSocket client connection and the cooperative client event loop.

use std::time::Instant;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use rookline_protocol::{
    ClientMessage, Codec, Envelope, JsonCodec, PROTOCOL_VERSION, ProtocolError, ServerMessage,
};
use rookline_rules::RulesEngine;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Client, ClientError, ClientEvent, DragDrop, Renderer};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One client's connection to an authority.
pub struct ClientConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    codec: JsonCodec,
    seq: u64,
    started: Instant,
    /// The `role-assigned` read during the handshake, handed out by the
    /// first `recv`.
    greeting: Option<ServerMessage>,
}

impl ClientConnection {
    /// Connects to `url`, sends `hello` (presenting `reconnect_token` if the
    /// client held a role before) and waits for the server's answer.
    ///
    /// # Errors
    /// [`ClientError::Server`] if the server refuses the `hello`, and
    /// [`ClientError::Closed`] if it hangs up before answering.
    pub async fn connect(url: &str, reconnect_token: Option<String>) -> Result<Self, ClientError> {
        let (ws, _response) = tokio_tungstenite::connect_async(url).await?;
        let (sink, stream) = ws.split();
        let mut conn = Self {
            sink,
            stream,
            codec: JsonCodec,
            seq: 0,
            started: Instant::now(),
            greeting: None,
        };

        conn.send(ClientMessage::Hello {
            version: PROTOCOL_VERSION,
            reconnect_token,
        })
        .await?;

        match conn.recv().await? {
            Some(msg @ ServerMessage::RoleAssigned { .. }) => conn.greeting = Some(msg),
            Some(ServerMessage::Error { code, message }) => {
                return Err(ClientError::Server { code, message });
            }
            Some(other) => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "expected role-assigned, got {other:?}"
                ))
                .into());
            }
            None => return Err(ClientError::Closed),
        }
        tracing::debug!(url, "connected");
        Ok(conn)
    }

    pub async fn send(&mut self, msg: ClientMessage) -> Result<(), ClientError> {
        self.seq += 1;
        let envelope = Envelope {
            seq: self.seq,
            timestamp: self.started.elapsed().as_millis() as u64,
            payload: msg,
        };
        let bytes = self.codec.encode(&envelope)?;
        self.sink.send(Message::Binary(bytes.into())).await?;
        Ok(())
    }

    /// Waits for the next message. `Ok(None)` means the server closed the
    /// connection.
    pub async fn recv(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        if let Some(msg) = self.greeting.take() {
            return Ok(Some(msg));
        }
        loop {
            let bytes: Vec<u8> = match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => data.into(),
                Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            };
            let envelope: Envelope<ServerMessage> = self.codec.decode(&bytes)?;
            return Ok(Some(envelope.payload));
        }
    }

    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.sink.close().await?;
        Ok(())
    }
}

/// Drives one client until the server closes the connection or the
/// gesture channel is dropped.
///
/// Runs on a single task: inbound messages and gestures are handled one at
/// a time, and nothing waits on anything but the next of either.
pub async fn run_client<R, V>(
    mut conn: ClientConnection,
    client: &mut Client<R>,
    renderer: &mut V,
    mut gestures: mpsc::Receiver<DragDrop>,
) -> Result<(), ClientError>
where
    R: RulesEngine,
    V: Renderer,
{
    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(msg)) => {
                    for event in client.handle(msg) {
                        match event {
                            ClientEvent::Render(view) => renderer.render(&view),
                            ClientEvent::Notice(notice) => renderer.notice(&notice),
                            ClientEvent::Outgoing(msg) => conn.send(msg).await?,
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("server closed the connection");
                    return Ok(());
                }
                Err(ClientError::Protocol(e @ ProtocolError::Decode(_))) => {
                    tracing::warn!(error = %e, "undecodable frame, requesting snapshot");
                    conn.send(ClientMessage::SnapshotRequest).await?;
                }
                Err(e) => return Err(e),
            },
            gesture = gestures.recv() => match gesture {
                Some(DragDrop { source, target }) => {
                    if let Some(msg) = client.drop_piece(source, target) {
                        conn.send(msg).await?;
                    }
                }
                None => {
                    conn.send(ClientMessage::Disconnect {
                        reason: "client closed".into(),
                    })
                    .await?;
                    conn.close().await?;
                    return Ok(());
                }
            },
        }
    }
}
