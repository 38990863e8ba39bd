//! DirectLine wire types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sender id stamped on every activity forwarded from WhatsApp
pub const WHATSAPP_USER_ID: &str = "whatsapp-user";

/// A freshly started DirectLine conversation.
///
/// Owned by the request that started it and never reused.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSession {
    pub conversation_id: String,
    pub token: String,
    pub stream_url: String,
}

impl fmt::Debug for ConversationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationSession")
            .field("conversation_id", &self.conversation_id)
            .field("token", &"<redacted>")
            .field("stream_url", &self.stream_url)
            .finish()
    }
}

/// Sender or recipient of an activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// A single DirectLine activity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type", default)]
    pub activity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ChannelAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Activity {
    /// Text message from the WhatsApp side of the bridge
    pub fn user_message(text: &str) -> Self {
        Self {
            activity_type: "message".to_string(),
            id: None,
            from: Some(ChannelAccount {
                id: WHATSAPP_USER_ID.to_string(),
                ..Default::default()
            }),
            text: Some(text.to_string()),
        }
    }

    /// True for a `message` activity authored by the bot
    pub fn is_bot_message(&self) -> bool {
        self.activity_type == "message"
            && self
                .from
                .as_ref()
                .and_then(|from| from.role.as_deref())
                == Some("bot")
    }
}

/// Frame pushed on the conversation stream
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivitySet {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub watermark: Option<String>,
}

impl ActivitySet {
    /// Text of the first bot message in this frame, if any.
    ///
    /// A bot message without text yields an empty string.
    pub fn first_bot_reply(&self) -> Option<String> {
        self.activities
            .iter()
            .find(|activity| activity.is_bot_message())
            .map(|activity| activity.text.clone().unwrap_or_default())
    }
}

/// Response to posting an activity
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceResponse {
    #[serde(default)]
    pub id: Option<String>,
}
