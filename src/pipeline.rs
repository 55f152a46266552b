//! Per-frame pipeline: data model, collaborator contracts, and the driver
//! that routes tracker output into the observation store and the shipper.

mod config;
mod detection;
mod driver;
mod sources;

pub use config::PipelineConfig;
pub use detection::{BoundingBox, ClassMapping, Frame, FrameDetection, RawDetection, TrackedDetection};
pub use driver::{FrameSummary, PipelineDriver, PipelineError};
pub use sources::{AnnotationSink, DetectionSource, IdentityTracker, NullAnnotationSink};
