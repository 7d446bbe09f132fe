use std::sync::Arc;
use std::time::Duration;

use meshroom_client::{
    ClientConfig, ClientError, LinkRole, LinkSnapshot, LinkState, LocalStream, MeshSession,
};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::integration::{init_tracing, spawn_server};
use crate::utils::{LINK_TIMEOUT_MS, MockTransportFactory, fake_local_stream};

async fn wait_for_links<F>(links: &mut watch::Receiver<Vec<LinkSnapshot>>, f: F) -> Vec<LinkSnapshot>
where
    F: FnMut(&Vec<LinkSnapshot>) -> bool,
{
    timeout(Duration::from_millis(LINK_TIMEOUT_MS), links.wait_for(f))
        .await
        .expect("Timed out waiting for link change")
        .expect("Session task ended")
        .clone()
}

#[tokio::test]
async fn test_two_sessions_link_up_and_tear_down() {
    init_tracing();
    let url = spawn_server().await;

    let a = MeshSession::join_with(
        ClientConfig::with_server_url(&url),
        "R1",
        fake_local_stream(),
        Arc::new(MockTransportFactory::new()),
    )
    .await
    .expect("A failed to join");

    let b = MeshSession::join_with(
        ClientConfig::with_server_url(&url),
        "R1",
        fake_local_stream(),
        Arc::new(MockTransportFactory::new()),
    )
    .await
    .expect("B failed to join");

    let mut a_links = a.links();
    let mut b_links = b.links();

    let a_view = wait_for_links(&mut a_links, |l| {
        l.len() == 1 && l[0].state == LinkState::Established
    })
    .await;
    assert_eq!(&a_view[0].peer_id, b.local_id());

    let b_view = wait_for_links(&mut b_links, |l| {
        l.len() == 1 && l[0].state == LinkState::Established
    })
    .await;
    assert_eq!(&b_view[0].peer_id, a.local_id());
    // Whoever joined second dials; the other side answers.
    assert_ne!(a_view[0].role, b_view[0].role);
    assert!([a_view[0].role, b_view[0].role].contains(&LinkRole::Initiator));

    b.leave().await.expect("B failed to leave");

    wait_for_links(&mut a_links, |l| l.is_empty()).await;

    a.leave().await.expect("A failed to leave");
}

#[tokio::test]
async fn test_join_without_local_media_is_refused() {
    init_tracing();
    let url = spawn_server().await;

    let result = MeshSession::join_with(
        ClientConfig::with_server_url(&url),
        "R1",
        LocalStream::default(),
        Arc::new(MockTransportFactory::new()),
    )
    .await;

    assert!(matches!(result, Err(ClientError::NoLocalMedia)));
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    init_tracing();

    let result = MeshSession::join_with(
        ClientConfig::with_server_url("ws://127.0.0.1:1/ws"),
        "R1",
        fake_local_stream(),
        Arc::new(MockTransportFactory::new()),
    )
    .await;

    assert!(matches!(result, Err(ClientError::WebSocket(_))));
}
