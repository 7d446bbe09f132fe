use meshroom_client::{ClientError, SignalingSink};
use meshroom_core::ClientMessage;
use std::sync::{Arc, Mutex};

/// Mock SignalingSink that records every frame the manager sends.
#[derive(Clone, Default)]
pub struct MockSignalingSink {
    sent: Arc<Mutex<Vec<ClientMessage>>>,
}

impl MockSignalingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl SignalingSink for MockSignalingSink {
    fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        tracing::debug!("[MockSignaling] send: {:?}", msg);
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}
