//! Data types shared between the performance core, storage and CLI

pub mod performance;
pub mod trace;
