//! Staged shipping runtime.
//!
//! Shipping performs blocking network I/O, so it runs behind a bounded
//! queue with its own worker pool instead of stalling frame processing. A
//! slow upload delays other ships at most up to the pool's parallelism
//! limit, never the observe/decide stage ahead of the queue.

mod ship_worker;

pub use ship_worker::{ShipHandle, ShipQueueClosed, ShipRequest, ShipWorkerPool};
