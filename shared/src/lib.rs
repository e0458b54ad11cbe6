//! Shared types and utilities for Vantage
//!
//! This crate contains the captured-trace input types, the per-command
//! performance result types, and the snapshot wire encoding used by the
//! performance core, the snapshot stores and the CLI.

pub mod protocol;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use types::{performance::*, trace::*};
