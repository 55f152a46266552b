//! Accumulated per-track observation statistics.

/// Statistics accumulated for a single track across frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStats {
    /// Track identifier assigned by the identity tracker
    pub id: String,
    /// Class label recorded on the first observation of this track
    pub label: String,
    /// Number of frames in which this track has been observed
    pub frequency: u32,
    /// Whether this track has already been shipped
    pub pushed: bool,
}

impl ItemStats {
    /// Create stats for a track seen for the first time.
    pub fn first_observation(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            frequency: 1,
            pushed: false,
        }
    }
}
