//! Binary encoding of performance snapshots
//!
//! Snapshots are stored content-addressed, so the encoding must be
//! byte-for-byte deterministic for identical content.

pub mod wire;
