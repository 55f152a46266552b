//! Shipper coordinating artifact persistence and notification emission.

use std::time::Duration;

use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use tracing::info;

use crate::shipping::payload::{DetectionPayload, MessageEnvelope};
use crate::shipping::sinks::{BlobSink, NotificationSink, PublishError, StorageError, content_type_for};

/// Binary payload associated with a shipped detection.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// Encoded image frame, stored as `.jpg`.
    Image(Bytes),
    /// Encoded video clip, stored as `.mp4`.
    Video(Bytes),
}

impl Artifact {
    fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Video(_) => "video",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            Self::Image(_) => "jpg",
            Self::Video(_) => "mp4",
        }
    }

    fn fallback_content_type(&self) -> &'static str {
        match self {
            Self::Image(_) => "image/jpeg",
            Self::Video(_) => "video/mp4",
        }
    }

    fn into_bytes(self) -> Bytes {
        match self {
            Self::Image(data) | Self::Video(data) => data,
        }
    }
}

/// A `ship` call failed. Carries the originating cause; the shipper never
/// retries internally.
#[derive(Debug, Error)]
pub enum ShipError {
    #[error("blob upload failed: {0}")]
    Storage(#[from] StorageError),
    #[error("notification publish failed: {0}")]
    Publish(#[from] PublishError),
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("ship deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// Outcome of a successful `ship` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipReceipt {
    pub detection_id: String,
    /// URI of the persisted image, if an image artifact was supplied.
    pub image_uri: Option<String>,
    /// URI of the persisted video, if a video artifact was supplied.
    pub video_uri: Option<String>,
    /// Message id returned by the notification sink.
    pub message_id: String,
}

/// Ships qualifying detections: persists the artifact through the blob sink
/// and emits exactly one notification through the notification sink.
///
/// A failure in either step aborts the whole call. Enforcing the
/// at-most-once-per-track guarantee is the caller's job (the observation
/// store's pushed flag); the shipper itself is stateless.
pub struct ArtifactShipper<B, N> {
    service_name: String,
    blob_sink: B,
    notification_sink: N,
}

impl<B: BlobSink, N: NotificationSink> ArtifactShipper<B, N> {
    /// Create a shipper emitting under the given service name.
    pub fn new(service_name: impl Into<String>, blob_sink: B, notification_sink: N) -> Self {
        Self {
            service_name: service_name.into(),
            blob_sink,
            notification_sink,
        }
    }

    /// Service name used in blob keys and message attributes.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Persist `artifact` (if any) and publish a notification for the
    /// detection.
    pub async fn ship(
        &self,
        id: &str,
        label: &str,
        artifact: Option<Artifact>,
    ) -> Result<ShipReceipt, ShipError> {
        let mut payload = DetectionPayload::new(id, label);

        if let Some(artifact) = artifact {
            let key = self.blob_key(&artifact, id);
            let content_type = content_type_for(&key, artifact.fallback_content_type());
            let kind = artifact.kind();
            let uri = self
                .blob_sink
                .put(artifact.into_bytes(), &key, content_type, true)
                .await?;
            info!(detection_id = %id, %uri, "saved detection artifact");
            match kind {
                "video" => payload.video = Some(uri),
                _ => payload.image = Some(uri),
            }
        }

        let envelope = MessageEnvelope::new(payload.clone(), &self.service_name, utc_timestamp());
        let message_id = self.notification_sink.publish(envelope.to_bytes()?).await?;
        info!(detection_id = %id, %message_id, "published detection notification");

        Ok(ShipReceipt {
            detection_id: id.to_owned(),
            image_uri: payload.image,
            video_uri: payload.video,
            message_id,
        })
    }

    /// Blob naming convention, fixed for downstream compatibility:
    /// `detections/{service}/{image|video}_{track_id}_{timestamp}.{jpg|mp4}`.
    fn blob_key(&self, artifact: &Artifact, id: &str) -> String {
        format!(
            "detections/{}/{}_{}_{}.{}",
            self.service_name,
            artifact.kind(),
            id,
            utc_timestamp(),
            artifact.extension()
        )
    }
}

/// Current time as ISO8601 UTC with microsecond precision and a trailing
/// "Z".
pub(crate) fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
