//! Collaborator contracts consumed by the pipeline driver.
//!
//! The detection model, the identity tracker, and the render path are all
//! external to this crate; implement these traits to plug real ones in.

use crate::pipeline::detection::{ClassMapping, Frame, FrameDetection, RawDetection, TrackedDetection};

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection model to the pipeline.
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run inference on a frame and return its raw detections.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<RawDetection>, Self::Error>;
}

/// Trait for cross-frame identity assignment.
///
/// Given a frame's raw detections, returns the same subset re-labeled with
/// persistent track ids. Ids are stable across calls for the same physical
/// object and are never reused for a different object within the tracker's
/// lifetime; the retirement policy is the tracker's own business.
pub trait IdentityTracker {
    /// Associate this frame's detections with persistent track ids.
    fn update(&mut self, detections: Vec<RawDetection>) -> Vec<TrackedDetection>;

    /// Track ids retired since the previous call.
    ///
    /// Used to release observation state for dead tracks. The default
    /// reports none, which matches trackers that never announce
    /// retirement.
    fn take_retired(&mut self) -> Vec<String> {
        Vec::new()
    }
}

/// Trait for the independent render/output path.
///
/// Called once per frame with every detection; must not influence track
/// state.
pub trait AnnotationSink {
    fn render(&mut self, frame: &Frame, detections: &[FrameDetection], classes: &ClassMapping);
}

/// Annotation sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnnotationSink;

impl AnnotationSink for NullAnnotationSink {
    fn render(&mut self, _frame: &Frame, _detections: &[FrameDetection], _classes: &ClassMapping) {}
}
