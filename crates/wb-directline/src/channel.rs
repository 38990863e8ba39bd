//! Bot conversation trait
//!
//! The webhook dispatcher talks to the bot platform only through this trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::client::DirectLineClient;
use crate::error::Result;
use crate::types::ConversationSession;

/// One conversation round trip with a bot: open, post, wait for the reply.
#[async_trait]
pub trait BotChannel: Send + Sync {
    /// Open a new conversation session
    async fn start_conversation(&self) -> Result<ConversationSession>;

    /// Post a user message, returning the created activity id
    async fn send_message(&self, session: &ConversationSession, text: &str) -> Result<String>;

    /// Wait for the bot's first reply, at most `budget`
    async fn await_reply(&self, session: &ConversationSession, budget: Duration) -> Result<String>;
}

#[async_trait]
impl BotChannel for DirectLineClient {
    async fn start_conversation(&self) -> Result<ConversationSession> {
        DirectLineClient::start_conversation(self).await
    }

    async fn send_message(&self, session: &ConversationSession, text: &str) -> Result<String> {
        DirectLineClient::send_message(self, session, text).await
    }

    async fn await_reply(&self, session: &ConversationSession, budget: Duration) -> Result<String> {
        DirectLineClient::await_reply(self, session, budget).await
    }
}
