use meshroom_core::{ClientMessage, RoomId, ServerMessage};

use crate::integration::{init_tracing, spawn_server};
use crate::utils::{TestClient, fake_signal};

#[tokio::test]
async fn test_three_participants_join_and_dial() {
    init_tracing();
    let addr = spawn_server().await;

    let mut a = TestClient::connect(addr).await.expect("A failed to connect");
    let mut b = TestClient::connect(addr).await.expect("B failed to connect");
    let mut c = TestClient::connect(addr).await.expect("C failed to connect");
    assert_ne!(a.peer_id, b.peer_id);

    let join = ClientMessage::JoinRoom(RoomId::from("R1"));

    a.send(&join).await.unwrap();
    assert_eq!(a.recv().await.unwrap(), ServerMessage::OtherParticipants(vec![]));

    b.send(&join).await.unwrap();
    assert_eq!(
        b.recv().await.unwrap(),
        ServerMessage::OtherParticipants(vec![a.peer_id.clone()])
    );

    c.send(&join).await.unwrap();
    assert_eq!(
        c.recv().await.unwrap(),
        ServerMessage::OtherParticipants(vec![a.peer_id.clone(), b.peer_id.clone()])
    );

    let offer = fake_signal("offer");
    b.send(&ClientMessage::Offer {
        target: a.peer_id.clone(),
        caller: b.peer_id.clone(),
        signal: offer.clone(),
    })
    .await
    .unwrap();

    assert_eq!(
        a.recv().await.unwrap(),
        ServerMessage::Offer {
            signal: offer,
            caller: b.peer_id.clone(),
        }
    );
    c.expect_silence(200).await.unwrap();

    let answer = fake_signal("answer");
    a.send(&ClientMessage::Answer {
        target: b.peer_id.clone(),
        signal: answer.clone(),
    })
    .await
    .unwrap();

    assert_eq!(
        b.recv().await.unwrap(),
        ServerMessage::Answer {
            signal: answer,
            caller: a.peer_id.clone(),
        }
    );

    a.close().await.unwrap();
    b.close().await.unwrap();
    c.close().await.unwrap();
}

#[tokio::test]
async fn test_dropped_connection_is_announced_to_room() {
    init_tracing();
    let addr = spawn_server().await;

    let mut a = TestClient::connect(addr).await.unwrap();
    let mut b = TestClient::connect(addr).await.unwrap();
    let join = ClientMessage::JoinRoom(RoomId::from("R1"));

    a.send(&join).await.unwrap();
    a.recv().await.unwrap();
    b.send(&join).await.unwrap();
    b.recv().await.unwrap();

    let b_id = b.peer_id.clone();
    b.close().await.unwrap();

    assert_eq!(
        a.recv().await.unwrap(),
        ServerMessage::ParticipantDeparted(b_id)
    );

    a.close().await.unwrap();
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    init_tracing();
    let addr = spawn_server().await;

    let mut a = TestClient::connect(addr).await.unwrap();

    a.send_raw("{ this is not json").await.unwrap();
    a.send_raw(r#"{"op":"kick","d":"everyone"}"#).await.unwrap();
    a.send(&ClientMessage::JoinRoom(RoomId::from("R1")))
        .await
        .unwrap();

    assert_eq!(a.recv().await.unwrap(), ServerMessage::OtherParticipants(vec![]));

    a.close().await.unwrap();
}
