//! WebSocket message types for the notification fan-out path.
//!
//! The hub treats `Notification` as opaque: it stamps routing metadata
//! (`target`, `created_at`) and otherwise never looks inside.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A notification or chat message pushed to connected clients.
///
/// Producers (chat-send, notification-create, admin-broadcast handlers)
/// build these with `target` and `created_at` unset; the hub fills both in
/// when it routes the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Type tag, e.g. "chat", "application_update", "system".
    #[serde(rename = "type")]
    pub kind: String,

    /// Short human-readable title.
    pub title: String,

    /// Message body.
    pub content: String,

    /// Resolved target identity. Stamped by the hub on targeted sends;
    /// absent on broadcasts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Stamped by the hub at routing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Arbitrary structured data, passed through untouched.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Notification {
    /// Create an unstamped notification.
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            content: content.into(),
            target: None,
            created_at: None,
            data: Value::Null,
        }
    }

    /// Attach structured data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Control frames clients may send on the inbound half of the socket.
///
/// These are parsed for liveness/extension purposes only; none of them is
/// currently wired to a state change. Unrecognized or malformed inbound text
/// is ignored, not fatal.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Keepalive response.
    Pong,

    /// Client marked a notification as read.
    MarkRead { notification_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_type_tag() {
        let n = Notification::new("chat", "New message", "hi");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "chat");
        assert_eq!(json["title"], "New message");
        // Unstamped fields and null data are omitted from the wire form.
        assert!(json.get("target").is_none());
        assert!(json.get("created_at").is_none());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_client_frame_parses_mark_read() {
        let frame: ClientFrame =
            serde_json::from_str(r#"{"type":"mark_read","notification_id":"n-1"}"#).unwrap();
        assert!(matches!(frame, ClientFrame::MarkRead { notification_id } if notification_id == "n-1"));
    }

    #[test]
    fn test_client_frame_rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientFrame>(r#"{"type":"dance"}"#).is_err());
    }
}
