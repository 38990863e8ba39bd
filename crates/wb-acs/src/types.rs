//! ACS Advanced Messaging wire types

use serde::{Deserialize, Serialize};

/// Notification kind on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Text,
}

/// Text notification sent through a WhatsApp channel registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNotificationContent {
    pub channel_registration_id: String,
    pub to: Vec<String>,
    pub kind: NotificationKind,
    pub content: String,
}

impl TextNotificationContent {
    /// Single-recipient text notification
    pub fn new(channel_registration_id: &str, to: &str, content: &str) -> Self {
        Self {
            channel_registration_id: channel_registration_id.to_string(),
            to: vec![to.to_string()],
            kind: NotificationKind::Text,
            content: content.to_string(),
        }
    }
}

/// Per-recipient delivery receipt
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageReceipt {
    pub message_id: String,
    pub to: String,
}

/// Response body of `notifications:send`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendMessageResult {
    #[serde(default)]
    pub receipts: Vec<MessageReceipt>,
}

/// ACS error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_notification_wire_format() {
        let content = TextNotificationContent::new("chan-1", "+15551234567", "Hi there");

        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            serde_json::json!({
                "channelRegistrationId": "chan-1",
                "to": ["+15551234567"],
                "kind": "text",
                "content": "Hi there"
            })
        );
    }

    #[test]
    fn test_send_result_parsing() {
        let result: SendMessageResult = serde_json::from_str(
            r#"{"receipts": [{"messageId": "m1", "to": "+15551234567"}]}"#,
        )
        .unwrap();

        assert_eq!(result.receipts.len(), 1);
        assert_eq!(result.receipts[0].message_id, "m1");
        assert_eq!(result.receipts[0].to, "+15551234567");

        let empty: SendMessageResult = serde_json::from_str("{}").unwrap();
        assert!(empty.receipts.is_empty());
    }
}
