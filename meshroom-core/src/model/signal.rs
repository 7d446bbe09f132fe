use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Negotiation payload produced and consumed by a peer transport.
///
/// The server never looks inside; it is relayed exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signal(pub Value);

impl Signal {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for Signal {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
