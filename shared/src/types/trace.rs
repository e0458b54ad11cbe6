//! Captured trace data
//!
//! These types describe the raw input handed over by the capture system:
//! GPU execution slices, the groups they belong to, and sampled hardware
//! counters.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Timestamp in nanoseconds on the GPU's monotonic clock
pub type Timestamp = u64;

/// Group identifier
pub type GroupId = i32;

/// One GPU execution span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    /// Group the slice belongs to
    pub group_id: GroupId,

    /// Nesting depth (0 = top level)
    pub depth: i32,

    /// Start timestamp
    pub ts: Timestamp,

    /// Duration in nanoseconds
    pub dur: u64,
}

impl Slice {
    pub fn new(group_id: GroupId, depth: i32, ts: Timestamp, dur: u64) -> Self {
        Self {
            group_id,
            depth,
            ts,
            dur,
        }
    }

    /// Exclusive end of the slice, clamped to the end of the clock
    pub fn end(&self) -> Timestamp {
        self.ts.saturating_add(self.dur)
    }
}

/// Reference to a recorded command, as a hierarchical index path
/// (e.g. `[submission, command buffer, command]`).
///
/// The path is owned by the capture system. It is copied around as a value
/// and only ever compared, never modified.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command {
    pub indices: Vec<u64>,
}

impl Command {
    pub fn new(indices: Vec<u64>) -> Self {
        Self { indices }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.indices.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Inclusive range of commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRange {
    pub from: Command,
    pub to: Command,
}

impl CommandRange {
    pub fn new(from: Command, to: Command) -> Self {
        Self { from, to }
    }

    /// Check whether `command` falls inside the range.
    ///
    /// Index paths compare lexicographically. Everything nested under `to`
    /// is part of the range, so `0.1 ..= 0.2` contains `0.2.7`.
    pub fn contains(&self, command: &Command) -> bool {
        let cmd = command.indices.as_slice();
        let to = self.to.indices.as_slice();
        self.from.indices.as_slice() <= cmd && (cmd <= to || cmd.starts_with(to))
    }
}

/// A logical unit of GPU work, linked to the command that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,

    /// Command this group was recorded for (None = not associated)
    #[serde(default)]
    pub link: Option<Command>,
}

/// All GPU slices of a capture together with their groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuSlices {
    pub slices: Vec<Slice>,
    pub groups: Vec<Group>,
}

/// A sampled hardware counter
///
/// `values[i]` holds over `(timestamps[i-1], timestamps[i]]`; the first value
/// also covers everything before `timestamps[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    #[serde(default)]
    pub id: u32,

    pub name: String,

    #[serde(default)]
    pub description: String,

    pub unit: String,

    /// Sample timestamps, strictly increasing
    pub timestamps: Vec<Timestamp>,

    /// Sample values, parallel to `timestamps`
    pub values: Vec<f64>,
}

impl Counter {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: String::new(),
            unit: unit.into(),
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builder-style helper to attach samples
    pub fn with_samples(mut self, timestamps: Vec<Timestamp>, values: Vec<f64>) -> Self {
        self.timestamps = timestamps;
        self.values = values;
        self
    }

    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }
}

/// Reasons a trace is rejected at ingestion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("counter '{name}' has {timestamps} timestamps but {values} values")]
    SampleLengthMismatch {
        name: String,
        timestamps: usize,
        values: usize,
    },

    #[error("counter '{name}' timestamps are not strictly increasing at sample {index}")]
    UnsortedCounter { name: String, index: usize },

    #[error("group {0} is defined more than once")]
    DuplicateGroup(GroupId),

    #[error("slice of group {group_id} at {ts} overflows the clock with duration {dur}")]
    SliceOverflow {
        group_id: GroupId,
        ts: Timestamp,
        dur: u64,
    },
}

/// Everything the performance computation consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceData {
    #[serde(flatten)]
    pub gpu_slices: GpuSlices,

    #[serde(default)]
    pub counters: Vec<Counter>,
}

impl TraceData {
    /// Parse a trace from its JSON representation
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject malformed input: mismatched or unsorted counter samples,
    /// duplicate groups and slices ending past the end of the clock.
    ///
    /// Zero-length slices are accepted; they contribute nothing.
    pub fn validate(&self) -> Result<(), TraceError> {
        let mut seen = HashSet::with_capacity(self.gpu_slices.groups.len());
        for group in &self.gpu_slices.groups {
            if !seen.insert(group.id) {
                return Err(TraceError::DuplicateGroup(group.id));
            }
        }

        for slice in &self.gpu_slices.slices {
            if slice.ts.checked_add(slice.dur).is_none() {
                return Err(TraceError::SliceOverflow {
                    group_id: slice.group_id,
                    ts: slice.ts,
                    dur: slice.dur,
                });
            }
        }

        for counter in &self.counters {
            if counter.timestamps.len() != counter.values.len() {
                return Err(TraceError::SampleLengthMismatch {
                    name: counter.name.clone(),
                    timestamps: counter.timestamps.len(),
                    values: counter.values.len(),
                });
            }
            if let Some(index) = counter
                .timestamps
                .windows(2)
                .position(|pair| pair[0] >= pair[1])
            {
                return Err(TraceError::UnsortedCounter {
                    name: counter.name.clone(),
                    index: index + 1,
                });
            }
        }

        Ok(())
    }
}
