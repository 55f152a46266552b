//! Pipeline configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::store::ShipPolicy;

/// Configuration for the full pipeline.
///
/// The tracker knobs (`distance_function`, `distance_threshold`,
/// `reid_hit_counter_max`) and `model_path` are passed through to the
/// identity tracker and detection source implementations; this crate only
/// carries them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Detector weights location, opaque to this crate.
    pub model_path: String,
    /// Metric used by the identity tracker, e.g. "euclidean".
    pub distance_function: String,
    /// Max distance for associating a detection to an existing track.
    pub distance_threshold: f32,
    /// Frames a track survives without a matching detection before
    /// retirement.
    pub reid_hit_counter_max: u32,
    /// Observations required before a track is shipped.
    pub push_frequency_threshold: u32,
    /// Class label that triggers shipping.
    pub target_label: String,
    /// Service identifier used in blob keys and message attributes.
    pub service_name: String,
    /// Maximum ships in flight at once.
    pub ship_workers: usize,
    /// Capacity of the queue in front of the ship workers.
    pub ship_queue_depth: usize,
    /// Per-ship deadline in seconds; exceeding it fails the ship.
    pub ship_deadline_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: "runs/detect/train2/weights/last.pt".to_owned(),
            distance_function: "euclidean".to_owned(),
            distance_threshold: 150.0,
            reid_hit_counter_max: 50,
            push_frequency_threshold: 5,
            target_label: "squirrel".to_owned(),
            service_name: "detector".to_owned(),
            ship_workers: 4,
            ship_queue_depth: 16,
            ship_deadline_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Shipping policy derived from this configuration.
    pub fn ship_policy(&self) -> ShipPolicy {
        ShipPolicy::new(self.push_frequency_threshold, self.target_label.clone())
    }

    /// Per-ship deadline as a duration.
    pub fn ship_deadline(&self) -> Duration {
        Duration::from_secs(self.ship_deadline_secs)
    }
}
