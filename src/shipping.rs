//! Artifact shipping: sink contracts, the notification envelope, and the
//! shipper that coordinates blob upload with notification publishing.

mod memory;
mod payload;
mod shipper;
mod sinks;

pub use memory::{MemoryBlobSink, MemoryNotificationSink, StoredBlob};
pub use payload::{DetectionPayload, MessageAttributes, MessageData, MessageEnvelope};
pub use shipper::{Artifact, ArtifactShipper, ShipError, ShipReceipt};
pub use sinks::{BlobSink, NotificationSink, PublishError, StorageError, content_type_for};
