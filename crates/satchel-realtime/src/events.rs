//! Wire types for the delivery channel.
//!
//! Every frame is a JSON text message shaped `{"event": ..., "data": ...}`.
//! Clients send [`ClientEvent`]s, the server pushes [`DeliveryEvent`]s.

use serde::{Deserialize, Serialize};

use satchel_core::{DocumentId, IdentityId, IdentitySummary, MediaKind};

/// Frames a client may send over the delivery channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind this connection to an identity's room. A second join rebinds.
    #[serde(rename_all = "camelCase")]
    Join { identity_id: IdentityId },
    /// Ask the server to relay a content notice to another room.
    SendMessage(RelayRequest),
}

/// Frames the server pushes to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum DeliveryEvent {
    /// New content addressed to the receiving identity.
    ReceiveMessage(ContentNotice),
    /// Someone added the receiving identity as a contact.
    ContactAdded { contact: IdentitySummary },
}

/// A client-relayed notice: `to` routes it, the rest is forwarded verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    pub to: IdentityId,
    pub from: IdentityId,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}

impl RelayRequest {
    /// The notice as the recipient sees it, routing field stripped.
    pub fn notice(&self) -> ContentNotice {
        ContentNotice {
            from: self.from,
            kind: self.kind,
            content: self.content.clone(),
            document_id: self.document_id,
        }
    }
}

/// Payload of a `receive_message` push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNotice {
    pub from: IdentityId,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}
