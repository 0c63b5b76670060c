//! JSON bodies exchanged with the REST interface.

use serde::{Deserialize, Serialize};

/// Response envelope. Payloads travel as a JSON document encoded into the
/// `content` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Encoded payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Human-readable note from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textual_info: Option<String>,
}

impl Message {
    /// Wraps `payload` into an envelope.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `payload` cannot be serialized.
    pub fn wrap<T: Serialize>(payload: &T) -> serde_json::Result<Self> {
        Ok(Self { content: Some(serde_json::to_string(payload)?), textual_info: None })
    }
}

/// Body of the client and node-id requests (`addClient`, `deleteClient`, `deleteNode`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdBody<T> {
    /// The referenced client or node.
    pub id: T,
}
