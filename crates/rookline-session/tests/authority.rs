//! Integration tests for the session actor, driven through its handle with
//! plain channels standing in for network connections.

use std::time::Duration;

use rookline_protocol::{Role, ServerMessage, Snapshot};
use rookline_registry::RegistryConfig;
use rookline_rules::{Color, MoveIntent, PieceKind, RulesEngine, StandardRules, Terminal};
use rookline_session::{GameState, SessionHandle, spawn_session};
use rookline_transport::ConnectionId;
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

fn start() -> SessionHandle {
    spawn_session(
        GameState::new(StandardRules),
        RegistryConfig {
            reconnect_grace_secs: 3600,
        },
        32,
    )
}

fn intent(from: &str, to: &str) -> MoveIntent {
    MoveIntent::new(from.parse().unwrap(), to.parse().unwrap())
        .with_promotion(PieceKind::Queen)
}

async fn join(session: &SessionHandle, id: u64, token: Option<String>) -> (Role, String, Inbox) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let admission = session
        .connect(ConnectionId::new(id), token, tx)
        .await
        .expect("admission should succeed");

    match next(&mut rx).await {
        ServerMessage::RoleAssigned {
            role,
            reconnect_token,
        } => {
            assert_eq!(role, admission.role);
            assert_eq!(reconnect_token, admission.token);
        }
        other => panic!("expected role-assigned first, got {other:?}"),
    }
    match next(&mut rx).await {
        ServerMessage::StateSnapshot(_) => {}
        other => panic!("expected state-snapshot second, got {other:?}"),
    }
    (admission.role, admission.token, rx)
}

async fn next(rx: &mut Inbox) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("outbound channel closed")
}

async fn next_snapshot(rx: &mut Inbox) -> Snapshot {
    match next(rx).await {
        ServerMessage::StateSnapshot(snapshot) => snapshot,
        other => panic!("expected state-snapshot, got {other:?}"),
    }
}

/// Round-trips through the actor so every earlier command has been handled.
async fn settle(session: &SessionHandle) {
    session.info().await.unwrap();
}

// =========================================================================
// Admission
// =========================================================================

#[tokio::test]
async fn test_roles_assigned_in_connection_order() {
    let session = start();

    let (r1, _, _a) = join(&session, 1, None).await;
    let (r2, _, _b) = join(&session, 2, None).await;
    let (r3, _, _c) = join(&session, 3, None).await;
    let (r4, _, _d) = join(&session, 4, None).await;

    assert_eq!([r1, r2, r3, r4], [Role::White, Role::Black, Role::Spectator, Role::Spectator]);

    let info = session.info().await.unwrap();
    assert_eq!(info.white, Some(ConnectionId::new(1)));
    assert_eq!(info.black, Some(ConnectionId::new(2)));
    assert_eq!(info.spectators, 2);
    assert_eq!(info.connections, 4);
}

#[tokio::test]
async fn test_late_joiner_receives_current_position() {
    let session = start();
    let (_, _, mut white) = join(&session, 1, None).await;
    let (_, _, _black) = join(&session, 2, None).await;
    session.propose(ConnectionId::new(1), intent("e2", "e4")).await.unwrap();
    next_snapshot(&mut white).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    session.connect(ConnectionId::new(3), None, tx).await.unwrap();

    assert!(matches!(next(&mut rx).await, ServerMessage::RoleAssigned { .. }));
    let snapshot = next_snapshot(&mut rx).await;
    assert_eq!(snapshot.version, 1);
    assert!(snapshot.position.contains("4P3"));
}

// =========================================================================
// Moves
// =========================================================================

#[tokio::test]
async fn test_accepted_move_broadcasts_to_everyone() {
    let session = start();
    let (_, _, mut white) = join(&session, 1, None).await;
    let (_, _, mut black) = join(&session, 2, None).await;
    let (_, _, mut spectator) = join(&session, 3, None).await;

    session.propose(ConnectionId::new(1), intent("e2", "e4")).await.unwrap();

    for inbox in [&mut white, &mut black, &mut spectator] {
        let snapshot = next_snapshot(inbox).await;
        assert_eq!(snapshot.version, 1);
        assert!(
            snapshot
                .position
                .starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq"),
            "{}",
            snapshot.position
        );
    }
}

#[tokio::test]
async fn test_rejected_move_goes_only_to_sender() {
    let session = start();
    let (_, _, mut white) = join(&session, 1, None).await;
    let (_, _, mut black) = join(&session, 2, None).await;
    session.propose(ConnectionId::new(1), intent("e2", "e4")).await.unwrap();
    next_snapshot(&mut white).await;
    next_snapshot(&mut black).await;

    // Black tries White's move again: e2 is empty now.
    session.propose(ConnectionId::new(2), intent("e2", "e4")).await.unwrap();

    assert!(matches!(next(&mut black).await, ServerMessage::MoveRejected { .. }));
    settle(&session).await;
    assert!(white.try_recv().is_err(), "rejections are never broadcast");
    assert_eq!(session.info().await.unwrap().version, 1);
}

#[tokio::test]
async fn test_spectator_move_is_rejected() {
    let session = start();
    let (_, _, _white) = join(&session, 1, None).await;
    let (_, _, _black) = join(&session, 2, None).await;
    let (_, _, mut spectator) = join(&session, 3, None).await;

    session.propose(ConnectionId::new(3), intent("e2", "e4")).await.unwrap();

    match next(&mut spectator).await {
        ServerMessage::MoveRejected { reason } => assert_eq!(reason, "spectators cannot move"),
        other => panic!("expected move-rejected, got {other:?}"),
    }
    assert_eq!(session.info().await.unwrap().version, 0);
}

#[tokio::test]
async fn test_concurrent_intents_are_serialized() {
    let session = start();
    let (_, _, mut white) = join(&session, 1, None).await;
    let (_, _, mut black) = join(&session, 2, None).await;

    // Both sides fire at once; only White's fits the position.
    let (a, b) = tokio::join!(
        session.propose(ConnectionId::new(1), intent("d2", "d4")),
        session.propose(ConnectionId::new(2), intent("g1", "f3")),
    );
    a.unwrap();
    b.unwrap();
    settle(&session).await;

    let info = session.info().await.unwrap();
    assert_eq!(info.version, 1);
    assert_eq!(next_snapshot(&mut white).await.version, 1);

    let mut saw_rejection = false;
    while let Ok(msg) = black.try_recv() {
        if matches!(msg, ServerMessage::MoveRejected { .. }) {
            saw_rejection = true;
        }
    }
    assert!(saw_rejection);
}

#[tokio::test]
async fn test_fools_mate_ends_in_checkmate() {
    let session = start();
    let (_, _, mut white) = join(&session, 1, None).await;
    let (_, _, _black) = join(&session, 2, None).await;

    let moves = [(1, "f2", "f3"), (2, "e7", "e5"), (1, "g2", "g4"), (2, "d8", "h4")];
    for (conn, from, to) in moves {
        session.propose(ConnectionId::new(conn), intent(from, to)).await.unwrap();
    }

    let mut last = None;
    for _ in 0..moves.len() {
        last = Some(next_snapshot(&mut white).await);
    }
    let last = last.unwrap();
    assert_eq!(last.version, 4);

    let rules = StandardRules;
    let position = rules.load(&last.position).unwrap();
    assert!(rules.assess(&position, last.repetitions).is_checkmate());

    let info = session.info().await.unwrap();
    assert_eq!(info.terminal, Some(Terminal::Checkmate { winner: Color::Black }));
}

#[tokio::test]
async fn test_snapshot_request_answers_only_requester() {
    let session = start();
    let (_, _, mut white) = join(&session, 1, None).await;
    let (_, _, mut black) = join(&session, 2, None).await;

    session.request_snapshot(ConnectionId::new(2)).await.unwrap();

    assert_eq!(next_snapshot(&mut black).await.version, 0);
    settle(&session).await;
    assert!(white.try_recv().is_err());
}

// =========================================================================
// Disconnect / reconnect
// =========================================================================

#[tokio::test]
async fn test_disconnect_frees_role_for_next_connection() {
    let session = start();
    let (_, _, _white) = join(&session, 1, None).await;
    let (_, _, _black) = join(&session, 2, None).await;

    assert_eq!(session.disconnect(ConnectionId::new(1)).await.unwrap(), Role::White);
    let (role, _, _rx) = join(&session, 3, None).await;

    assert_eq!(role, Role::White);
}

#[tokio::test]
async fn test_reconnect_token_reclaims_vacant_role() {
    let session = start();
    let (_, _, _white) = join(&session, 1, None).await;
    let (_, token, _black) = join(&session, 2, None).await;
    session.disconnect(ConnectionId::new(2)).await.unwrap();

    let (role, new_token, _rx) = join(&session, 5, Some(token.clone())).await;

    assert_eq!(role, Role::Black);
    assert_eq!(new_token, token);
    assert_eq!(session.info().await.unwrap().black, Some(ConnectionId::new(5)));
}

#[tokio::test]
async fn test_reconnect_token_takes_over_seat_from_silent_holder() {
    let session = start();
    let (_, token, mut stale_white) = join(&session, 1, None).await;
    let (_, _, mut black) = join(&session, 2, None).await;

    // Connection 1 never disconnects.
    let (role, _, mut white) = join(&session, 3, Some(token)).await;
    assert_eq!(role, Role::White);

    assert!(matches!(
        next(&mut stale_white).await,
        ServerMessage::Error { code: 409, .. }
    ));
    let closed = tokio::time::timeout(Duration::from_secs(2), stale_white.recv())
        .await
        .unwrap();
    assert_eq!(closed, None, "displaced connection's channel should close");

    // The game goes on with the new holder.
    session.propose(ConnectionId::new(3), intent("e2", "e4")).await.unwrap();
    assert_eq!(next_snapshot(&mut white).await.version, 1);
    assert_eq!(next_snapshot(&mut black).await.version, 1);

    // The stale guard's late disconnect changes nothing.
    assert!(session.disconnect(ConnectionId::new(1)).await.is_err());
    assert_eq!(session.info().await.unwrap().white, Some(ConnectionId::new(3)));
}

#[tokio::test]
async fn test_handle_reports_unavailable_after_shutdown() {
    let session = start();
    session.shutdown().await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(session.info().await.is_err());
}
