//! Snapshot storage for Vantage
//!
//! Persists crude performance snapshots under their content id so they can be
//! re-queried after the computation that produced them has finished.

pub mod config;
pub mod metrics;
pub mod storage;

pub use storage::{FileStore, MemoryStore, SnapshotId, SnapshotStore, StoreError};
