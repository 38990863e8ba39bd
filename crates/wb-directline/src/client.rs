//! DirectLine REST API client
//!
//! Starts conversations and posts user activities.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use wb_core::DirectLineConfig;

use crate::error::{DirectLineError, Result};
use crate::stream;
use crate::types::{Activity, ConversationSession, ResourceResponse};

/// DirectLine API client
#[derive(Clone)]
pub struct DirectLineClient {
    client: Client,
    base_url: String,
    secret: String,
}

impl DirectLineClient {
    /// Create a new DirectLine client
    pub fn new(base_url: &str, secret: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret: secret.to_string(),
        })
    }

    /// Create a client from the `[directline]` config section
    pub fn from_config(config: &DirectLineConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.secret)
    }

    /// Start a new conversation
    ///
    /// Only `201 Created` counts as success.
    pub async fn start_conversation(&self) -> Result<ConversationSession> {
        let url = format!("{}/conversations", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            error!("Start conversation failed: {} - {}", status, body);
            return Err(DirectLineError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let session: ConversationSession = response
            .json()
            .await
            .map_err(|e| DirectLineError::Parse(e.to_string()))?;

        info!("Started DirectLine conversation {}", session.conversation_id);
        Ok(session)
    }

    /// Post a user text message into the conversation
    ///
    /// Returns the id DirectLine assigned to the activity.
    pub async fn send_message(&self, session: &ConversationSession, text: &str) -> Result<String> {
        let url = format!(
            "{}/conversations/{}/activities",
            self.base_url, session.conversation_id
        );

        debug!("Posting activity to conversation {}", session.conversation_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.token)
            .json(&Activity::user_message(text))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            error!("Send activity failed: {} - {}", status, body);
            return Err(DirectLineError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let resource: ResourceResponse = response
            .json()
            .await
            .map_err(|e| DirectLineError::Parse(e.to_string()))?;

        match resource.id {
            Some(id) if !id.is_empty() => {
                debug!("Activity {} accepted", id);
                Ok(id)
            }
            _ => Err(DirectLineError::MissingActivityId),
        }
    }

    /// Wait on the conversation stream for the bot's first reply
    pub async fn await_reply(
        &self,
        session: &ConversationSession,
        budget: Duration,
    ) -> Result<String> {
        stream::await_bot_reply(&session.stream_url, &session.token, budget).await
    }
}
