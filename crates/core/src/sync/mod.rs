//! Sync queue: durable record of local mutations awaiting transmission.

mod sync_model;
mod sync_queue;
mod sync_traits;

pub use sync_model::{FlushFailure, FlushReport, SyncOperation, SyncQueueItem};
pub use sync_queue::SyncQueue;
pub use sync_traits::SyncTransmitter;

#[cfg(test)]
mod sync_queue_tests;
