//! Per-frame pipeline driver.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::pipeline::config::PipelineConfig;
use crate::pipeline::detection::{ClassMapping, Frame, FrameDetection};
use crate::pipeline::sources::{AnnotationSink, DetectionSource, IdentityTracker};
use crate::runtime::{ShipHandle, ShipRequest};
use crate::shipping::Artifact;
use crate::store::{ObservationStore, ShipPolicy};

/// A frame could not be processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The detection source failed for the whole frame.
    #[error("detection failed: {0}")]
    Detection(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The shipping runtime has shut down.
    #[error("ship queue closed")]
    ShipQueueClosed,
}

/// What happened while processing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameSummary {
    pub frame_id: u64,
    /// Raw detections produced by the detection source.
    pub detections: usize,
    /// Detections that carried a track id.
    pub tracked: usize,
    /// Tracks that qualified and were handed to the shipper.
    pub shipped: usize,
}

/// Orchestrates the per-frame flow: detect, track, observe/decide, ship,
/// render.
///
/// Errors local to one track id never abort the frame; only a detection
/// source failure or a closed shipping runtime does.
pub struct PipelineDriver<D, T, A> {
    detector: D,
    tracker: Option<T>,
    annotations: A,
    classes: ClassMapping,
    store: Arc<ObservationStore>,
    policy: ShipPolicy,
    ships: ShipHandle,
}

impl<D, T, A> PipelineDriver<D, T, A>
where
    D: DetectionSource,
    T: IdentityTracker,
    A: AnnotationSink,
{
    /// Create a driver. Without a tracker, detections stay raw and nothing
    /// is ever observed or shipped; the render path still runs.
    pub fn new(
        detector: D,
        tracker: Option<T>,
        annotations: A,
        classes: ClassMapping,
        store: Arc<ObservationStore>,
        policy: ShipPolicy,
        ships: ShipHandle,
    ) -> Self {
        Self {
            detector,
            tracker,
            annotations,
            classes,
            store,
            policy,
            ships,
        }
    }

    /// Create a driver with the policy taken from `config`.
    pub fn from_config(
        detector: D,
        tracker: Option<T>,
        annotations: A,
        classes: ClassMapping,
        store: Arc<ObservationStore>,
        config: &PipelineConfig,
        ships: ShipHandle,
    ) -> Self {
        Self::new(
            detector,
            tracker,
            annotations,
            classes,
            store,
            config.ship_policy(),
            ships,
        )
    }

    /// Process one frame end to end.
    pub async fn process_frame(&mut self, frame: Frame) -> Result<FrameSummary, PipelineError> {
        let raw = self
            .detector
            .detect(&frame)
            .map_err(|e| PipelineError::Detection(Box::new(e)))?;

        let mut summary = FrameSummary {
            frame_id: frame.frame_id,
            detections: raw.len(),
            ..FrameSummary::default()
        };

        // Resolve the detection shape once, at this boundary.
        let detections: Vec<FrameDetection> = match self.tracker.as_mut() {
            Some(tracker) => tracker
                .update(raw)
                .into_iter()
                .map(FrameDetection::Tracked)
                .collect(),
            None => raw.into_iter().map(FrameDetection::Raw).collect(),
        };

        for detection in &detections {
            let FrameDetection::Tracked(tracked) = detection else {
                continue;
            };
            summary.tracked += 1;

            let Some(label) = self.classes.label(tracked.label_index) else {
                warn!(
                    track_id = %tracked.track_id,
                    label_index = tracked.label_index,
                    "unknown class index, skipping observation"
                );
                continue;
            };

            let observation = self
                .store
                .observe_and_evaluate(&tracked.track_id, label, &self.policy);
            if observation.qualified {
                debug!(
                    track_id = %tracked.track_id,
                    frequency = observation.stats.frequency,
                    "track qualified for shipping"
                );
                self.ships
                    .submit(ShipRequest {
                        detection_id: tracked.track_id.clone(),
                        label: label.to_owned(),
                        artifact: Some(Artifact::Image(frame.bytes.clone())),
                    })
                    .await
                    .map_err(|_| PipelineError::ShipQueueClosed)?;
                summary.shipped += 1;
            }
        }

        // Release observation state for tracks the tracker retired.
        if let Some(tracker) = self.tracker.as_mut() {
            let retired = tracker.take_retired();
            if !retired.is_empty() {
                let released = self.store.release_retired(&retired);
                debug!(retired = retired.len(), released, "released retired tracks");
            }
        }

        // Rendering is routed independently and never touches track state.
        self.annotations.render(&frame, &detections, &self.classes);

        Ok(summary)
    }

    /// Get a reference to the underlying detection source.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detection source.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the identity tracker, if one is configured.
    pub fn tracker(&self) -> Option<&T> {
        self.tracker.as_ref()
    }

    /// Get a reference to the observation store.
    pub fn store(&self) -> &Arc<ObservationStore> {
        &self.store
    }
}
