//! Rows persisted in the shared database.

use mugiwara_shared::{DeliveryStatus, MessageKind, ParticipantId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered participant and their public profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Participant id (phone number). Primary key.
    pub id: ParticipantId,
    /// Human-readable display name.
    pub display_name: String,
    /// Avatar URL or data-URI.
    pub avatar: String,
    /// Free-form status line. `None` for rows written before the column existed.
    pub about: Option<String>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A stored message. `body` is whatever the codec produced, or legacy plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub id: String,
    pub sender_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub body: String,
    pub kind: MessageKind,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub status: DeliveryStatus,
}

impl MessageRow {
    /// The participant on the other end, from `self_id`'s point of view.
    pub fn peer_of(&self, self_id: &ParticipantId) -> &ParticipantId {
        if &self.sender_id == self_id {
            &self.receiver_id
        } else {
            &self.sender_id
        }
    }
}
