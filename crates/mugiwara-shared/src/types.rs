use serde::{Deserialize, Serialize};

use crate::constants::{PREVIEW_AUDIO, PREVIEW_IMAGE, PREVIEW_MEDIA, PREVIEW_VIDEO};

// User identity = phone number, used verbatim as primary key and KDF input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What a message body carries. Media travels as a data-URI string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    Video,
    Audio,
    /// Written by some other client; kept as-is.
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other(s) => s,
        }
    }

    /// Rows written before the `kind` column existed have no kind; they are text.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("text") => Self::Text,
            Some("image") => Self::Image,
            Some("video") => Self::Video,
            Some("audio") => Self::Audio,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Label shown in a conversation preview instead of the body, if any.
    pub fn preview_label(&self) -> Option<&'static str> {
        match self {
            Self::Text => None,
            Self::Image => Some(PREVIEW_IMAGE),
            Self::Video => Some(PREVIEW_VIDEO),
            Self::Audio => Some(PREVIEW_AUDIO),
            Self::Other(_) => Some(PREVIEW_MEDIA),
        }
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        Self::from_column(Some(&s))
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Only `Sent` is ever written; the other states have no writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Sent,
    Delivered,
    Read,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }

    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("delivered") => Self::Delivered,
            Some("read") => Self::Read,
            _ => Self::Sent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_kind_is_text() {
        assert_eq!(MessageKind::from_column(None), MessageKind::Text);
        assert_eq!(MessageKind::from_column(Some("")), MessageKind::Text);
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let kind = MessageKind::from_column(Some("sticker"));
        assert_eq!(kind.as_str(), "sticker");
        assert_eq!(kind.preview_label(), Some(PREVIEW_MEDIA));
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&MessageKind::Audio).unwrap();
        assert_eq!(json, "\"audio\"");
        let back: MessageKind = serde_json::from_str("\"image\"").unwrap();
        assert_eq!(back, MessageKind::Image);
    }

    #[test]
    fn status_defaults_to_sent() {
        assert_eq!(DeliveryStatus::from_column(None), DeliveryStatus::Sent);
        assert_eq!(DeliveryStatus::from_column(Some("read")), DeliveryStatus::Read);
        assert_eq!(DeliveryStatus::default().as_str(), "sent");
    }
}
