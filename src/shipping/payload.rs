//! Notification payload shape.
//!
//! The wire format is fixed for downstream compatibility:
//!
//! ```json
//! {
//!   "data": { "payload": { "detection_id": "...", "label": "...", "image": "...", "video": "..." } },
//!   "attributes": { "service": "...", "timestamp": "..." }
//! }
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Detection metadata carried in a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionPayload {
    /// Track id of the shipped detection.
    pub detection_id: String,
    /// Class label of the shipped detection.
    pub label: String,
    /// URI of the persisted image artifact, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// URI of the persisted video artifact, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl DetectionPayload {
    /// Payload with no artifact URIs attached yet.
    pub fn new(detection_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            detection_id: detection_id.into(),
            label: label.into(),
            image: None,
            video: None,
        }
    }
}

/// Data section of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageData {
    pub payload: DetectionPayload,
}

/// Envelope attributes identifying the emitting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttributes {
    /// Name of the service that emitted the notification.
    pub service: String,
    /// Emission timestamp, ISO8601 UTC with trailing "Z".
    pub timestamp: String,
}

/// Complete notification message as published to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub data: MessageData,
    pub attributes: MessageAttributes,
}

impl MessageEnvelope {
    /// Wrap a payload with the standard attributes.
    pub fn new(
        payload: DetectionPayload,
        service: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            data: MessageData { payload },
            attributes: MessageAttributes {
                service: service.into(),
                timestamp: timestamp.into(),
            },
        }
    }

    /// Encode the envelope as JSON bytes.
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}
