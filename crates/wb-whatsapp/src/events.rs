//! Event Grid webhook events sent by ACS Advanced Messaging

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, WhatsAppError};

pub const SUBSCRIPTION_VALIDATION_EVENT: &str = "Microsoft.EventGrid.SubscriptionValidationEvent";
pub const MESSAGE_RECEIVED_EVENT: &str = "Microsoft.Communication.AdvancedMessageReceived";
pub const DELIVERY_STATUS_UPDATED_EVENT: &str =
    "Microsoft.Communication.AdvancedMessageDeliveryStatusUpdated";

/// What the dispatcher does with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SubscriptionValidation,
    MessageReceived,
    DeliveryStatusUpdated,
    Other,
}

/// One item of an Event Grid batch
///
/// Only `eventType` and `data` are read. A non-string `eventType` classifies
/// as [`EventKind::Other`] instead of failing the batch.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub event_type: Option<String>,
    pub data: Value,
}

/// Inbound WhatsApp text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub from: String,
    pub content: String,
}

/// Delivery status change, only logged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatus {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl WebhookEvent {
    /// Build an event from one batch element, which must be a JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(WhatsAppError::InvalidPayload(format!(
                    "expected an event object, got {}",
                    other
                )));
            }
        };

        Ok(Self {
            event_type: fields
                .get("eventType")
                .and_then(Value::as_str)
                .map(str::to_string),
            data: fields.remove("data").unwrap_or(Value::Null),
        })
    }

    pub fn kind(&self) -> EventKind {
        match self.event_type.as_deref() {
            Some(SUBSCRIPTION_VALIDATION_EVENT) => EventKind::SubscriptionValidation,
            Some(MESSAGE_RECEIVED_EVENT) => EventKind::MessageReceived,
            Some(DELIVERY_STATUS_UPDATED_EVENT) => EventKind::DeliveryStatusUpdated,
            _ => EventKind::Other,
        }
    }

    fn data_str(&self, event_type: &'static str, field: &'static str) -> Result<String> {
        self.data
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(WhatsAppError::MissingField { event_type, field })
    }

    /// `data.validationCode` of a subscription validation event, echoed as-is
    pub fn validation_code(&self) -> Result<Value> {
        self.data
            .get("validationCode")
            .cloned()
            .ok_or(WhatsAppError::MissingField {
                event_type: "subscription validation",
                field: "validationCode",
            })
    }

    /// `data.from` and `data.content` of a message-received event
    pub fn received_message(&self) -> Result<ReceivedMessage> {
        Ok(ReceivedMessage {
            from: self.data_str("message received", "from")?,
            content: self.data_str("message received", "content")?,
        })
    }

    /// Best-effort view of a delivery status event
    pub fn delivery_status(&self) -> DeliveryStatus {
        serde_json::from_value(self.data.clone()).unwrap_or_default()
    }
}

/// Decode a request body into an event batch.
///
/// `Ok(None)` means valid JSON that is not a list.
pub fn parse_batch(body: &[u8]) -> Result<Option<Vec<WebhookEvent>>> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| WhatsAppError::InvalidPayload(e.to_string()))?;

    let Value::Array(items) = value else {
        return Ok(None);
    };

    items
        .into_iter()
        .map(WebhookEvent::from_value)
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> WebhookEvent {
        WebhookEvent::from_value(value).unwrap()
    }

    #[test]
    fn test_kind_classification() {
        let cases = [
            (SUBSCRIPTION_VALIDATION_EVENT, EventKind::SubscriptionValidation),
            (MESSAGE_RECEIVED_EVENT, EventKind::MessageReceived),
            (DELIVERY_STATUS_UPDATED_EVENT, EventKind::DeliveryStatusUpdated),
            ("Microsoft.Storage.BlobCreated", EventKind::Other),
        ];

        for (event_type, kind) in cases {
            assert_eq!(event(json!({ "eventType": event_type, "data": {} })).kind(), kind);
        }
        assert_eq!(event(json!({ "data": {} })).kind(), EventKind::Other);
    }

    #[test]
    fn test_received_message() {
        let e = event(json!({
            "id": "evt-1",
            "eventType": MESSAGE_RECEIVED_EVENT,
            "subject": "advancedMessage/sender/+15551234567/recipient/chan-1",
            "data": {
                "content": "Hola",
                "channelType": "whatsapp",
                "from": "+15551234567",
                "to": "chan-1",
                "receivedTimestamp": "2024-03-05T07:08:09Z"
            }
        }));

        assert_eq!(
            e.received_message().unwrap(),
            ReceivedMessage {
                from: "+15551234567".to_string(),
                content: "Hola".to_string(),
            }
        );
    }

    #[test]
    fn test_received_message_missing_content() {
        let e = event(json!({
            "eventType": MESSAGE_RECEIVED_EVENT,
            "data": { "from": "+15551234567" }
        }));

        let err = e.received_message().unwrap_err();
        assert_eq!(err.to_string(), "Missing field 'content' in message received event");
    }

    #[test]
    fn test_validation_code() {
        let e = event(json!({
            "eventType": SUBSCRIPTION_VALIDATION_EVENT,
            "data": { "validationCode": "512d38b6-c7b8-40c8-89fe-f46f9e9622b6" }
        }));
        assert_eq!(e.validation_code().unwrap(), "512d38b6-c7b8-40c8-89fe-f46f9e9622b6");

        let numeric = event(json!({
            "eventType": SUBSCRIPTION_VALIDATION_EVENT,
            "data": { "validationCode": 1234 }
        }));
        assert_eq!(numeric.validation_code().unwrap(), json!(1234));

        let missing = event(json!({ "eventType": SUBSCRIPTION_VALIDATION_EVENT }));
        assert!(missing.validation_code().is_err());
    }

    #[test]
    fn test_delivery_status_is_lenient() {
        let e = event(json!({
            "eventType": DELIVERY_STATUS_UPDATED_EVENT,
            "data": { "messageId": "m1", "status": "delivered", "to": "+1" }
        }));
        let status = e.delivery_status();
        assert_eq!(status.message_id.as_deref(), Some("m1"));
        assert_eq!(status.status.as_deref(), Some("delivered"));

        let odd = event(json!({ "eventType": DELIVERY_STATUS_UPDATED_EVENT, "data": [1, 2] }));
        assert!(odd.delivery_status().status.is_none());
    }

    #[test]
    fn test_parse_batch() {
        assert!(parse_batch(br#"{"eventType": "x"}"#).unwrap().is_none());
        assert_eq!(parse_batch(b"[]").unwrap().unwrap().len(), 0);
        assert!(matches!(
            parse_batch(b"not json"),
            Err(WhatsAppError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_batch(b"[1, 2]"),
            Err(WhatsAppError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_parse_batch_tolerates_odd_envelope_fields() {
        let body = json!([
            { "id": 42, "subject": ["x"], "eventType": 7, "data": {} },
            { "eventType": SUBSCRIPTION_VALIDATION_EVENT, "data": { "validationCode": "abc" } }
        ]);

        let batch = parse_batch(body.to_string().as_bytes()).unwrap().unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].kind(), EventKind::Other);
        assert_eq!(batch[1].kind(), EventKind::SubscriptionValidation);
    }
}
