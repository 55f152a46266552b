//! Frame and detection data types shared across the pipeline.

use bytes::Bytes;

/// A single decoded frame handed to the pipeline.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Encoded frame bytes, shared cheaply with the shipper.
    pub bytes: Bytes,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Monotonic frame sequence number.
    pub frame_id: u64,
}

impl Frame {
    pub fn new(bytes: Bytes, width: u32, height: u32, frame_id: u64) -> Self {
        Self {
            bytes,
            width,
            height,
            frame_id,
        }
    }
}

/// Axis-aligned bounding box in TLBR frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// A detection straight from the detection source, before identity
/// assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Class index into the detector's class mapping.
    pub class_index: usize,
    /// Detection confidence score.
    pub confidence: f32,
    /// Detected bounding box.
    pub bbox: BoundingBox,
}

/// A detection re-labeled by the identity tracker with a persistent track
/// id.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDetection {
    /// Stable identifier, reused across frames for the same object.
    pub track_id: String,
    /// Class index into the detector's class mapping.
    pub label_index: usize,
    /// Estimated bounding box for the current frame.
    pub bbox: BoundingBox,
}

/// Per-frame detection, tagged by whether identity assignment ran.
///
/// The variant is resolved once at the driver boundary; downstream
/// consumers use the uniform accessors instead of inspecting the shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameDetection {
    Raw(RawDetection),
    Tracked(TrackedDetection),
}

impl FrameDetection {
    /// Bounding box of the detection.
    pub fn bbox(&self) -> BoundingBox {
        match self {
            Self::Raw(det) => det.bbox,
            Self::Tracked(det) => det.bbox,
        }
    }

    /// Class index of the detection.
    pub fn class_index(&self) -> usize {
        match self {
            Self::Raw(det) => det.class_index,
            Self::Tracked(det) => det.label_index,
        }
    }

    /// Track id, present only for tracked detections.
    pub fn track_id(&self) -> Option<&str> {
        match self {
            Self::Raw(_) => None,
            Self::Tracked(det) => Some(&det.track_id),
        }
    }
}

/// Class-index-to-name mapping, static for the lifetime of a detector
/// instance.
#[derive(Debug, Clone, Default)]
pub struct ClassMapping {
    names: Vec<String>,
}

impl ClassMapping {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Label for `index`, if the index is known.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
