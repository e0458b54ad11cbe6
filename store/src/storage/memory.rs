//! In-memory snapshot store

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;
use vantage_shared::types::performance::CrudePerformance;

use super::{decode_verified, encode, record_store, SnapshotId, SnapshotStore, StoreError};

/// Snapshot store backed by a map. Thread-safe.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<SnapshotId, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, snapshot: &CrudePerformance) -> (Result<SnapshotId, StoreError>, usize) {
        let (id, bytes) = match encode(snapshot) {
            Ok(encoded) => encoded,
            Err(e) => return (Err(e), 0),
        };
        let len = bytes.len();
        let mut snapshots = match self.snapshots.write() {
            Ok(guard) => guard,
            Err(e) => return (Err(StoreError::Poisoned(e.to_string())), 0),
        };
        if snapshots.contains_key(&id) {
            debug!("Snapshot {} already stored", id);
        } else {
            snapshots.insert(id, bytes);
        }
        (Ok(id), len)
    }
}

impl SnapshotStore for MemoryStore {
    fn store(&self, snapshot: &CrudePerformance) -> Result<SnapshotId, StoreError> {
        let (result, len) = self.insert(snapshot);
        record_store(&result, len);
        result
    }

    fn resolve(&self, id: &SnapshotId) -> Result<CrudePerformance, StoreError> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        let bytes = snapshots.get(id).ok_or(StoreError::NotFound(*id))?;
        decode_verified(id, bytes)
    }
}
