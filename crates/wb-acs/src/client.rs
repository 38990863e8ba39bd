//! ACS Advanced Messaging REST client

use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, error, info};
use url::Url;

use crate::auth::{self, ConnectionString};
use crate::error::{AcsError, Result};
use crate::types::{ErrorResponse, SendMessageResult, TextNotificationContent};

/// Advanced Messaging API version
pub const API_VERSION: &str = "2024-02-01";

/// ACS notification messages client
#[derive(Debug, Clone)]
pub struct AcsClient {
    client: Client,
    connection: ConnectionString,
}

impl AcsClient {
    /// Create a client from an `endpoint=...;accesskey=...` connection string
    pub fn new(connection_string: &str) -> Result<Self> {
        let connection = ConnectionString::parse(connection_string)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, connection })
    }

    fn send_url(&self) -> Result<Url> {
        let base = self.connection.endpoint.as_str().trim_end_matches('/');
        Url::parse(&format!(
            "{}/messages/notifications:send?api-version={}",
            base, API_VERSION
        ))
        .map_err(|e| AcsError::InvalidConnectionString(e.to_string()))
    }

    /// Send a notification
    pub async fn send(&self, content: &TextNotificationContent) -> Result<SendMessageResult> {
        let url = self.send_url()?;
        let body = serde_json::to_vec(content).map_err(|e| AcsError::Parse(e.to_string()))?;

        let date = auth::http_date(chrono::Utc::now());
        let signed = auth::sign_request(self.connection.access_key(), "POST", &url, &body, &date)?;

        debug!("Sending ACS notification to {} recipient(s)", content.to.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-ms-date", &signed.date)
            .header("x-ms-content-sha256", &signed.content_hash)
            .header("authorization", &signed.authorization)
            .header("repeatability-request-id", uuid::Uuid::new_v4().to_string())
            .header("repeatability-first-sent", &signed.date)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("ACS send failed: {} - {}", status, text);
            return Err(AcsError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let result: SendMessageResult = response
            .json()
            .await
            .map_err(|e| AcsError::Parse(e.to_string()))?;

        info!("ACS accepted notification ({} receipt(s))", result.receipts.len());
        Ok(result)
    }
}

/// Prefer the service's `error.message`, falling back to the raw body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error: Some(detail),
        }) => match (detail.code, detail.message) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => body.to_string(),
        },
        _ => body.to_string(),
    }
}
