use meshroom_client::{ClientError, LinkRole};
use meshroom_core::{PeerId, ServerMessage};

use crate::integration::{TestManager, create_test_manager, init_tracing};
use crate::utils::{fake_signal, pump};

#[tokio::test]
async fn test_answer_from_unknown_caller_is_ignored() {
    init_tracing();

    let TestManager {
        mut manager,
        factory,
        sink,
        ..
    } = create_test_manager();
    let stranger = PeerId::new();

    let err = manager
        .handle_server_message(ServerMessage::Answer {
            signal: fake_signal("answer"),
            caller: stranger.clone(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedAnswer(id) if id == stranger));
    assert!(manager.is_empty());
    assert!(factory.created().is_empty());
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn test_answer_to_responder_link_is_rejected() {
    init_tracing();

    let TestManager {
        mut manager,
        mut events,
        factory,
        ..
    } = create_test_manager();
    let a = PeerId::new();

    manager.on_offer(a.clone(), fake_signal("offer")).await.unwrap();
    pump(&mut manager, &mut events).await;

    let err = manager
        .on_answer(a.clone(), fake_signal("answer"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedAnswer(_)));
    assert_eq!(factory.fed_to(&a), vec![fake_signal("offer")]);
    assert_eq!(manager.link(&a).unwrap().role(), LinkRole::Responder);
}

#[tokio::test]
async fn test_offer_colliding_with_outbound_link_is_rejected() {
    init_tracing();

    let TestManager {
        mut manager,
        mut events,
        factory,
        ..
    } = create_test_manager();
    let b = PeerId::new();

    manager.on_other_participants(vec![b.clone()]).await;
    pump(&mut manager, &mut events).await;

    let err = manager
        .on_offer(b.clone(), fake_signal("offer"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::OfferCollision(id) if id == b));
    assert_eq!(factory.created(), vec![(b.clone(), LinkRole::Initiator)]);
    assert!(factory.fed_to(&b).is_empty());
}
