//! Snapshot wire format.
//!
//! Uses bincode with an explicit config so every writer and reader agree on
//! the encoding (fixint for lengths and enum tags). Result maps are ordered,
//! which makes the bytes a stable function of the snapshot's content and lets
//! stores address snapshots by a hash of them.

use crate::types::performance::CrudePerformance;
use anyhow::Result;
use bincode::Options;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Single bincode config for the snapshot format.
fn wire_bincode() -> impl bincode::config::Options {
    bincode::config::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
}

/// Versioned snapshot envelope
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SnapshotEnvelope {
    pub version: u32,
    pub snapshot: CrudePerformance,
}

impl SnapshotEnvelope {
    /// Wrap a snapshot with the current format version
    pub fn new(snapshot: CrudePerformance) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            snapshot,
        }
    }

    /// Serialize to bytes (bincode, fixint encoding).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        wire_bincode().serialize(self).map_err(Into::into)
    }

    /// Deserialize from bytes, validating the format version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: Self = wire_bincode().deserialize(bytes)?;
        if envelope.version != SNAPSHOT_VERSION {
            anyhow::bail!(
                "unsupported snapshot version {} (expected {})",
                envelope.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(envelope)
    }
}

/// Encode a snapshot in the current format
pub fn encode_snapshot(snapshot: &CrudePerformance) -> Result<Vec<u8>> {
    SnapshotEnvelope::new(snapshot.clone()).to_bytes()
}

/// Decode a snapshot previously produced by [`encode_snapshot`]
pub fn decode_snapshot(bytes: &[u8]) -> Result<CrudePerformance> {
    SnapshotEnvelope::from_bytes(bytes).map(|e| e.snapshot)
}
