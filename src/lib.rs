//! Frequency-gated shipping pipeline for tracked object detections.
//!
//! This crate sits between a detector/tracker pair and durable side
//! effects. It maintains per-track observation statistics across frames,
//! decides exactly once when a track qualifies for shipping, and ships by
//! persisting an artifact to a blob sink and emitting one notification per
//! qualifying track.
//!
//! The detection model, the identity tracker, and the storage/messaging
//! transports are all external collaborators plugged in through the traits
//! in [`pipeline`] and [`shipping`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trackship_rs::pipeline::{ClassMapping, NullAnnotationSink, PipelineConfig, PipelineDriver};
//! use trackship_rs::runtime::ShipWorkerPool;
//! use trackship_rs::shipping::ArtifactShipper;
//! use trackship_rs::store::ObservationStore;
//!
//! let config = PipelineConfig::default();
//! let shipper = Arc::new(ArtifactShipper::new(&config.service_name, blob_sink, notification_sink));
//! let (ships, pool) = ShipWorkerPool::spawn(
//!     shipper,
//!     config.ship_workers,
//!     config.ship_queue_depth,
//!     config.ship_deadline(),
//! );
//!
//! let store = Arc::new(ObservationStore::new());
//! let mut driver = PipelineDriver::from_config(
//!     detector, Some(tracker), NullAnnotationSink, classes, store, &config, ships,
//! );
//!
//! while let Some(frame) = frames.next().await {
//!     driver.process_frame(frame).await?;
//! }
//!
//! drop(driver);
//! pool.shutdown().await;
//! ```

pub mod pipeline;
pub mod runtime;
pub mod shipping;
pub mod store;

pub use pipeline::{
    ClassMapping, DetectionSource, Frame, FrameDetection, IdentityTracker, PipelineConfig,
    PipelineDriver, RawDetection, TrackedDetection,
};
pub use runtime::{ShipHandle, ShipWorkerPool};
pub use shipping::{Artifact, ArtifactShipper, BlobSink, NotificationSink, ShipError};
pub use store::{ItemStats, ObservationStore, ShipPolicy, UnknownTrackError};
