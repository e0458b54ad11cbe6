//! Snapshot storage backends
//!
//! Snapshots are addressed by the SHA-256 of their encoded bytes. Storing the
//! same content twice yields the same id.

pub mod file;
pub mod memory;

use sha2::{Digest, Sha256};
use std::str::FromStr;
use thiserror::Error;
use vantage_shared::protocol::wire;
use vantage_shared::types::performance::CrudePerformance;
use vantage_shared::utils::{bytes_to_hex, hex_to_bytes};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Content id of a stored snapshot
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SnapshotId([u8; 32]);

impl SnapshotId {
    /// Handle returned when no durable snapshot is available
    pub const INVALID: SnapshotId = SnapshotId([0; 32]);

    /// Id of the given encoded snapshot bytes
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut id = [0u8; 32];
        id.copy_from_slice(&digest);
        Self(id)
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&bytes_to_hex(&self.0))
    }
}

impl std::fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SnapshotId({})", self)
    }
}

impl FromStr for SnapshotId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex_to_bytes(s)?;
        let id: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| anyhow::anyhow!("Snapshot id must be 32 bytes, got {}", b.len()))?;
        Ok(Self(id))
    }
}

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("failed to decode snapshot {id}: {reason}")]
    Decode { id: SnapshotId, reason: String },

    #[error("snapshot {0} not found")]
    NotFound(SnapshotId),

    #[error("snapshot {0} content does not match its id")]
    Corrupted(SnapshotId),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned: {0}")]
    Poisoned(String),
}

/// Content-addressed, idempotent snapshot store
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot and return its content id
    fn store(&self, snapshot: &CrudePerformance) -> Result<SnapshotId, StoreError>;

    /// Load a previously stored snapshot
    fn resolve(&self, id: &SnapshotId) -> Result<CrudePerformance, StoreError>;
}

/// Encode a snapshot and compute its id.
pub(crate) fn encode(snapshot: &CrudePerformance) -> Result<(SnapshotId, Vec<u8>), StoreError> {
    let bytes = wire::encode_snapshot(snapshot).map_err(|e| StoreError::Encode(e.to_string()))?;
    Ok((SnapshotId::of_bytes(&bytes), bytes))
}

/// Decode snapshot bytes after checking them against `id`.
pub(crate) fn decode_verified(id: &SnapshotId, bytes: &[u8]) -> Result<CrudePerformance, StoreError> {
    if SnapshotId::of_bytes(bytes) != *id {
        return Err(StoreError::Corrupted(*id));
    }
    wire::decode_snapshot(bytes).map_err(|e| StoreError::Decode {
        id: *id,
        reason: e.to_string(),
    })
}

/// Record the outcome of a store call in the metrics registry
pub(crate) fn record_store(result: &Result<SnapshotId, StoreError>, bytes: usize) {
    match result {
        Ok(_) => {
            crate::metrics::SNAPSHOT_STORE_TOTAL
                .with_label_values(&["ok"])
                .inc();
            crate::metrics::SNAPSHOT_BYTES.inc_by(bytes as f64);
        }
        Err(_) => crate::metrics::SNAPSHOT_STORE_TOTAL
            .with_label_values(&["error"])
            .inc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_is_zero() {
        assert!(!SnapshotId::INVALID.is_valid());
        assert!(SnapshotId::INVALID.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(SnapshotId::default(), SnapshotId::INVALID);
    }

    #[test]
    fn test_id_hex_roundtrip() {
        let id = SnapshotId::of_bytes(b"vantage");
        assert!(id.is_valid());
        let hex = id.to_string();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex.parse::<SnapshotId>().unwrap(), id);
    }

    #[test]
    fn test_id_parse_rejects_wrong_length() {
        assert!("deadbeef".parse::<SnapshotId>().is_err());
    }

    #[test]
    fn test_same_content_same_id() {
        let (a, _) = encode(&CrudePerformance::default()).unwrap();
        let (b, _) = encode(&CrudePerformance::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_verified_detects_tampering() {
        let (id, mut bytes) = encode(&CrudePerformance::default()).unwrap();
        assert!(decode_verified(&id, &bytes).is_ok());
        bytes.push(0);
        assert!(matches!(
            decode_verified(&id, &bytes),
            Err(StoreError::Corrupted(_))
        ));
    }
}
