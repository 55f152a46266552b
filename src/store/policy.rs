//! Shipping qualification policy.

use crate::store::ItemStats;

/// Policy deciding when a track's accumulated statistics qualify for shipping.
///
/// The decision is a pure function of the stats: it performs no I/O and
/// mutates nothing, so the actual shipping can fail or be retried without
/// corrupting the frequency bookkeeping.
#[derive(Debug, Clone)]
pub struct ShipPolicy {
    /// Observations required before a track is shipped.
    pub push_frequency_threshold: u32,
    /// Class label that triggers shipping.
    pub target_label: String,
}

impl Default for ShipPolicy {
    fn default() -> Self {
        Self {
            push_frequency_threshold: 5,
            target_label: "squirrel".to_owned(),
        }
    }
}

impl ShipPolicy {
    /// Create a new shipping policy.
    pub fn new(push_frequency_threshold: u32, target_label: impl Into<String>) -> Self {
        Self {
            push_frequency_threshold,
            target_label: target_label.into(),
        }
    }

    /// Whether the given stats qualify for shipping right now.
    ///
    /// A track qualifies once its observation count reaches the threshold,
    /// its label matches the target, and it has not been shipped before.
    pub fn qualifies(&self, stats: &ItemStats) -> bool {
        stats.frequency >= self.push_frequency_threshold
            && stats.label == self.target_label
            && !stats.pushed
    }
}
