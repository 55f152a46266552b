//! Contracts for the blob storage and notification transports.
//!
//! Implement these traits to connect the shipper to real backends (object
//! storage, pub/sub messaging). Neither contract retries internally;
//! failures surface to the shipper's caller.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Blob persistence failed (network, permissions, quota).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Notification emission failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("publish error: {0}")]
pub struct PublishError(pub String);

/// Durable blob storage.
#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Persist `data` under `key` and return a durable URI for it.
    ///
    /// `public` requests public readability of the stored blob.
    async fn put(
        &self,
        data: Bytes,
        key: &str,
        content_type: &str,
        public: bool,
    ) -> Result<String, StorageError>;
}

/// Notification transport.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Publish an encoded message and return the transport's message id.
    async fn publish(&self, message: Bytes) -> Result<String, PublishError>;
}

#[async_trait]
impl<T: BlobSink + ?Sized> BlobSink for std::sync::Arc<T> {
    async fn put(
        &self,
        data: Bytes,
        key: &str,
        content_type: &str,
        public: bool,
    ) -> Result<String, StorageError> {
        (**self).put(data, key, content_type, public).await
    }
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    async fn publish(&self, message: Bytes) -> Result<String, PublishError> {
        (**self).publish(message).await
    }
}

/// Infer a content type from the blob key's extension.
pub fn content_type_for(key: &str, fallback: &'static str) -> &'static str {
    match key.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("mp4") => "video/mp4",
        _ => fallback,
    }
}
