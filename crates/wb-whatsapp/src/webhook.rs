//! Webhook server for receiving WhatsApp events from ACS

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dispatcher::{Dispatcher, WebhookReply};
use crate::error::{Result, WhatsAppError};

/// Create the webhook router
pub fn create_router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook/whatsapp", post(handle_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

/// Liveness message
async fn root() -> Json<Value> {
    Json(json!({
        "message": "Hello! Your server is running and ready to receive messages from ACS."
    }))
}

/// Handle an Event Grid batch
///
/// The body is taken raw so that malformed JSON gets the same error shape
/// as every other rejection.
async fn handle_webhook(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> WebhookReply {
    dispatcher.dispatch(&body).await
}

/// Webhook server
pub struct WebhookServer {
    addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
}

impl WebhookServer {
    /// Create a new webhook server
    pub fn new(addr: SocketAddr, dispatcher: Dispatcher) -> Self {
        Self {
            addr,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Starting WhatsApp webhook server on {}", self.addr);

        let app = create_router(self.dispatcher);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| WhatsAppError::Server(e.to_string()))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| WhatsAppError::Server(e.to_string()))?;

        info!("Webhook server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::dispatcher::tests::{FakeBot, RecordingSender, dispatcher};
    use crate::events::{DELIVERY_STATUS_UPDATED_EVENT, MESSAGE_RECEIVED_EVENT};

    fn app(bot: Arc<FakeBot>, sender: Arc<RecordingSender>) -> Router {
        create_router(Arc::new(dispatcher(bot, sender)))
    }

    async fn body_to_json(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_webhook(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/webhook/whatsapp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let app = app(Arc::new(FakeBot::default()), Arc::new(RecordingSender::default()));

        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_to_json(resp).await;
        assert!(json["message"].as_str().unwrap().contains("ready to receive"));
    }

    #[tokio::test]
    async fn test_webhook_relays_message() {
        let bot = Arc::new(FakeBot::replying("pong"));
        let sender = Arc::new(RecordingSender::default());
        let app = app(bot, sender.clone());

        let body = json!([{
            "eventType": MESSAGE_RECEIVED_EVENT,
            "data": { "from": "+15551234567", "content": "ping" }
        }]);
        let resp = app.oneshot(post_webhook(body.to_string())).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_to_json(resp).await;
        assert_eq!(json["text"], "pong");
        assert_eq!(json["acs_status"], 202);
        assert_eq!(sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_delivery_ack() {
        let app = app(Arc::new(FakeBot::default()), Arc::new(RecordingSender::default()));

        let body = json!([{
            "eventType": DELIVERY_STATUS_UPDATED_EVENT,
            "data": { "messageId": "m1", "status": "read" }
        }]);
        let resp = app.oneshot(post_webhook(body.to_string())).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_to_json(resp).await, json!({}));
    }

    #[tokio::test]
    async fn test_webhook_rejects_object_and_garbage() {
        let app = app(Arc::new(FakeBot::default()), Arc::new(RecordingSender::default()));

        let resp = app
            .clone()
            .oneshot(post_webhook(json!({ "eventType": "x" }).to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_to_json(resp).await, json!({ "error": "Unsupported event type" }));

        let resp = app.oneshot(post_webhook("<xml/>")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_to_json(resp).await;
        assert!(json["error"].as_str().unwrap().starts_with("Exception: "));
    }
}
