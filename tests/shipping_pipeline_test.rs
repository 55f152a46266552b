use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use trackship_rs::pipeline::{
    BoundingBox, ClassMapping, Frame, NullAnnotationSink, PipelineDriver, RawDetection,
    TrackedDetection,
};
use trackship_rs::runtime::{ShipHandle, ShipWorkerPool};
use trackship_rs::shipping::{
    ArtifactShipper, BlobSink, MemoryBlobSink, MemoryNotificationSink, MessageEnvelope,
    StorageError,
};
use trackship_rs::store::{ObservationStore, ShipPolicy};
use trackship_rs::{DetectionSource, IdentityTracker};

/// Detector that emits a scripted set of detections every frame.
struct ScriptedDetector {
    detections: Vec<RawDetection>,
}

impl DetectionSource for ScriptedDetector {
    type Error = std::convert::Infallible;

    fn detect(&mut self, _frame: &Frame) -> Result<Vec<RawDetection>, Self::Error> {
        Ok(self.detections.clone())
    }
}

/// Tracker that assigns track ids by detection position within the frame.
struct PositionalTracker {
    ids: Vec<String>,
}

impl IdentityTracker for PositionalTracker {
    fn update(&mut self, detections: Vec<RawDetection>) -> Vec<TrackedDetection> {
        detections
            .into_iter()
            .zip(&self.ids)
            .map(|(d, id)| TrackedDetection {
                track_id: id.clone(),
                label_index: d.class_index,
                bbox: d.bbox,
            })
            .collect()
    }
}

/// Blob sink that fails every upload.
struct BrokenBlobSink;

#[async_trait]
impl BlobSink for BrokenBlobSink {
    async fn put(
        &self,
        _data: Bytes,
        _key: &str,
        _content_type: &str,
        _public: bool,
    ) -> Result<String, StorageError> {
        Err(StorageError("bucket unavailable".to_owned()))
    }
}

fn detection(class_index: usize, x: f32) -> RawDetection {
    RawDetection {
        class_index,
        confidence: 0.85,
        bbox: BoundingBox::new(x, 20.0, x + 40.0, 60.0),
    }
}

fn frame(frame_id: u64) -> Frame {
    Frame::new(Bytes::from(format!("frame-{frame_id}")), 640, 480, frame_id)
}

fn spawn_pool<B: BlobSink + 'static>(
    blob_sink: B,
    notifications: Arc<MemoryNotificationSink>,
) -> (ShipHandle, ShipWorkerPool) {
    let shipper = Arc::new(ArtifactShipper::new("backyard-cam", blob_sink, notifications));
    ShipWorkerPool::spawn(shipper, 2, 8, Duration::from_secs(5))
}

#[tokio::test]
async fn test_end_to_end_ship_on_fifth_observation() {
    let notifications = Arc::new(MemoryNotificationSink::new());
    let blobs = Arc::new(MemoryBlobSink::new());
    let (ships, pool) = spawn_pool(Arc::clone(&blobs), Arc::clone(&notifications));

    // Two tracks per frame: a squirrel ("t1") and a cat ("t2").
    let store = Arc::new(ObservationStore::new());
    let mut driver = PipelineDriver::new(
        ScriptedDetector {
            detections: vec![detection(1, 10.0), detection(0, 300.0)],
        },
        Some(PositionalTracker {
            ids: vec!["t1".to_owned(), "t2".to_owned()],
        }),
        NullAnnotationSink,
        ClassMapping::new(["cat", "squirrel"]),
        Arc::clone(&store),
        ShipPolicy::new(5, "squirrel"),
        ships,
    );

    // Frames 1-4: both tracks accumulate, nothing ships yet.
    for n in 1..=4 {
        let summary = driver.process_frame(frame(n)).await.unwrap();
        assert_eq!(summary.detections, 2);
        assert_eq!(summary.tracked, 2);
        assert_eq!(summary.shipped, 0);
    }

    // Frame 5: the squirrel track reaches the threshold and ships once.
    let summary = driver.process_frame(frame(5)).await.unwrap();
    assert_eq!(summary.shipped, 1);

    // Frames 6-10: the squirrel keeps counting but never ships again.
    for n in 6..=10 {
        let summary = driver.process_frame(frame(n)).await.unwrap();
        assert_eq!(summary.shipped, 0);
    }

    let squirrel = store.get("t1").unwrap();
    assert_eq!(squirrel.label, "squirrel");
    assert_eq!(squirrel.frequency, 10);
    assert!(squirrel.pushed);

    let cat = store.get("t2").unwrap();
    assert_eq!(cat.label, "cat");
    assert_eq!(cat.frequency, 10);
    assert!(!cat.pushed);

    drop(driver);
    pool.shutdown().await;

    // Exactly one artifact, from the qualifying frame.
    let stored = blobs.blobs();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].data, Bytes::from_static(b"frame-5"));
    assert!(stored[0].key.starts_with("detections/backyard-cam/image_t1_"));
    assert!(stored[0].key.ends_with(".jpg"));
    assert!(stored[0].public);

    // Exactly one notification, with the fixed envelope shape.
    let messages = notifications.messages();
    assert_eq!(messages.len(), 1);
    let envelope: MessageEnvelope = serde_json::from_slice(&messages[0]).unwrap();
    assert_eq!(envelope.data.payload.detection_id, "t1");
    assert_eq!(envelope.data.payload.label, "squirrel");
    assert_eq!(
        envelope.data.payload.image.as_deref(),
        Some(format!("mem://{}", stored[0].key).as_str())
    );
    assert!(envelope.data.payload.video.is_none());
    assert_eq!(envelope.attributes.service, "backyard-cam");
    assert!(envelope.attributes.timestamp.ends_with('Z'));
}

#[tokio::test]
async fn test_storage_failure_does_not_stall_the_pipeline() {
    let notifications = Arc::new(MemoryNotificationSink::new());
    let (ships, pool) = spawn_pool(BrokenBlobSink, Arc::clone(&notifications));

    let store = Arc::new(ObservationStore::new());
    let mut driver = PipelineDriver::new(
        ScriptedDetector {
            detections: vec![detection(1, 10.0)],
        },
        Some(PositionalTracker {
            ids: vec!["t1".to_owned()],
        }),
        NullAnnotationSink,
        ClassMapping::new(["cat", "squirrel"]),
        Arc::clone(&store),
        ShipPolicy::new(3, "squirrel"),
        ships,
    );

    // The ship fails in the worker; frame processing keeps going.
    for n in 1..=6 {
        driver.process_frame(frame(n)).await.unwrap();
    }

    // The track forfeited its one shipping opportunity: pushed stays set
    // and no second ship is attempted.
    let stats = store.get("t1").unwrap();
    assert_eq!(stats.frequency, 6);
    assert!(stats.pushed);

    drop(driver);
    pool.shutdown().await;

    // Upload failed before the publish step, so nothing was emitted.
    assert!(notifications.messages().is_empty());
}

#[tokio::test]
async fn test_distinct_tracks_ship_independently() {
    let notifications = Arc::new(MemoryNotificationSink::new());
    let blobs = Arc::new(MemoryBlobSink::new());
    let (ships, pool) = spawn_pool(Arc::clone(&blobs), Arc::clone(&notifications));

    // Two squirrel tracks side by side.
    let store = Arc::new(ObservationStore::new());
    let mut driver = PipelineDriver::new(
        ScriptedDetector {
            detections: vec![detection(1, 10.0), detection(1, 300.0)],
        },
        Some(PositionalTracker {
            ids: vec!["t1".to_owned(), "t2".to_owned()],
        }),
        NullAnnotationSink,
        ClassMapping::new(["cat", "squirrel"]),
        Arc::clone(&store),
        ShipPolicy::new(2, "squirrel"),
        ships,
    );

    driver.process_frame(frame(1)).await.unwrap();
    let summary = driver.process_frame(frame(2)).await.unwrap();
    // Both tracks reach the threshold in the same frame.
    assert_eq!(summary.shipped, 2);

    drop(driver);
    pool.shutdown().await;

    assert_eq!(notifications.messages().len(), 2);
    let mut shipped_ids: Vec<String> = notifications
        .messages()
        .iter()
        .map(|m| {
            let envelope: MessageEnvelope = serde_json::from_slice(m).unwrap();
            envelope.data.payload.detection_id
        })
        .collect();
    shipped_ids.sort();
    assert_eq!(shipped_ids, vec!["t1", "t2"]);
}
