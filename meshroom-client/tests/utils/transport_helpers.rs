use anyhow::{Context, Result};
use meshroom_client::TransportEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Timeout for a real peer connection to gather, negotiate and connect (ms).
pub const WEBRTC_TIMEOUT_MS: u64 = 15000;

pub async fn next_event(
    events: &mut mpsc::Receiver<TransportEvent>,
    timeout_ms: u64,
) -> Result<TransportEvent> {
    timeout(Duration::from_millis(timeout_ms), events.recv())
        .await
        .context("Timed out waiting for a transport event")?
        .context("Transport event channel closed")
}

/// Skips events until `matches` accepts one.
pub async fn wait_for_event<F>(
    events: &mut mpsc::Receiver<TransportEvent>,
    timeout_ms: u64,
    mut matches: F,
) -> Result<TransportEvent>
where
    F: FnMut(&TransportEvent) -> bool,
{
    loop {
        let event = next_event(events, timeout_ms).await?;
        if matches(&event) {
            return Ok(event);
        }
        tracing::debug!("Skipping {:?}", event);
    }
}
