//! Bounded ship queue and worker pool.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info};

use crate::shipping::{Artifact, ArtifactShipper, BlobSink, NotificationSink, ShipError};

/// A shipping job for one qualifying track.
#[derive(Debug, Clone)]
pub struct ShipRequest {
    pub detection_id: String,
    pub label: String,
    pub artifact: Option<Artifact>,
}

/// The worker pool has shut down and no longer accepts requests.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("ship queue closed")]
pub struct ShipQueueClosed;

/// Producer side of the ship queue.
///
/// Cloneable; submitting awaits queue capacity when the queue is full
/// (backpressure) rather than dropping the request, since the track's
/// pushed flag is already set by the time a request exists.
#[derive(Debug, Clone)]
pub struct ShipHandle {
    tx: mpsc::Sender<ShipRequest>,
}

impl ShipHandle {
    /// Enqueue a shipping job.
    pub async fn submit(&self, request: ShipRequest) -> Result<(), ShipQueueClosed> {
        self.tx.send(request).await.map_err(|_| ShipQueueClosed)
    }
}

/// Pool of workers draining the ship queue with bounded parallelism.
///
/// Each ship runs under a per-call deadline; exceeding it fails that ship
/// with [`ShipError::DeadlineExceeded`]. Failures are logged and dropped,
/// never retried.
pub struct ShipWorkerPool {
    dispatcher: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl ShipWorkerPool {
    /// Spawn the pool and return the handle used to submit jobs.
    ///
    /// `parallelism` bounds concurrent ships, `queue_depth` bounds pending
    /// jobs, and `deadline` bounds each individual ship call.
    pub fn spawn<B, N>(
        shipper: Arc<ArtifactShipper<B, N>>,
        parallelism: usize,
        queue_depth: usize,
        deadline: Duration,
    ) -> (ShipHandle, Self)
    where
        B: BlobSink + 'static,
        N: NotificationSink + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<ShipRequest>(queue_depth.max(1));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let dispatcher = tokio::spawn(async move {
            let permits = Arc::new(Semaphore::new(parallelism.max(1)));
            let mut in_flight = JoinSet::new();
            let mut closing = false;

            loop {
                tokio::select! {
                    received = rx.recv() => {
                        let Some(request) = received else { break };

                        // Reap completed ships so the set does not grow
                        // unbounded.
                        while in_flight.try_join_next().is_some() {}

                        let Ok(permit) = permits.clone().acquire_owned().await else {
                            break;
                        };
                        let shipper = Arc::clone(&shipper);
                        in_flight.spawn(async move {
                            execute_ship(&shipper, request, deadline).await;
                            drop(permit);
                        });
                    }
                    _ = shutdown_rx.changed(), if !closing => {
                        // Refuse new submissions; already-queued requests
                        // still drain through the recv arm above.
                        closing = true;
                        rx.close();
                    }
                }
            }

            // Let in-flight ships complete or fail, each already bounded
            // by the deadline.
            while in_flight.join_next().await.is_some() {}
        });

        (
            ShipHandle { tx },
            Self {
                dispatcher,
                shutdown_tx,
            },
        )
    }

    /// Stop accepting new requests, drain queued and in-flight ships, and
    /// wait for the pool to exit.
    ///
    /// Also returns once the pool has drained naturally after every
    /// `ShipHandle` clone was dropped.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(join_error) = self.dispatcher.await {
            error!(%join_error, "ship dispatcher terminated abnormally");
        }
    }
}

async fn execute_ship<B, N>(shipper: &ArtifactShipper<B, N>, request: ShipRequest, deadline: Duration)
where
    B: BlobSink,
    N: NotificationSink,
{
    let result = match tokio::time::timeout(
        deadline,
        shipper.ship(&request.detection_id, &request.label, request.artifact),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(ShipError::DeadlineExceeded(deadline)),
    };

    // The pushed flag stays set either way: a failed ship forfeits the
    // track's single shipping opportunity.
    match result {
        Ok(receipt) => {
            info!(
                detection_id = %receipt.detection_id,
                message_id = %receipt.message_id,
                "shipped detection"
            );
        }
        Err(error) => {
            error!(detection_id = %request.detection_id, %error, "error shipping detection");
        }
    }
}
