//! In-memory sink implementations.
//!
//! Useful for tests and for running the pipeline without real storage or
//! messaging backends.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::shipping::sinks::{BlobSink, NotificationSink, PublishError, StorageError};

/// A blob captured by [`MemoryBlobSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: String,
    pub content_type: String,
    pub public: bool,
    pub data: Bytes,
}

/// Blob sink that keeps uploads in memory and returns `mem://` URIs.
#[derive(Debug, Default)]
pub struct MemoryBlobSink {
    blobs: Mutex<Vec<StoredBlob>>,
}

impl MemoryBlobSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All blobs stored so far, in upload order.
    pub fn blobs(&self) -> Vec<StoredBlob> {
        self.blobs.lock().clone()
    }
}

#[async_trait]
impl BlobSink for MemoryBlobSink {
    async fn put(
        &self,
        data: Bytes,
        key: &str,
        content_type: &str,
        public: bool,
    ) -> Result<String, StorageError> {
        self.blobs.lock().push(StoredBlob {
            key: key.to_owned(),
            content_type: content_type.to_owned(),
            public,
            data,
        });
        Ok(format!("mem://{key}"))
    }
}

/// Notification sink that collects published messages in memory.
#[derive(Debug, Default)]
pub struct MemoryNotificationSink {
    messages: Mutex<Vec<Bytes>>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far, in publish order.
    pub fn messages(&self) -> Vec<Bytes> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn publish(&self, message: Bytes) -> Result<String, PublishError> {
        let mut messages = self.messages.lock();
        messages.push(message);
        Ok(format!("mem-{}", messages.len()))
    }
}
