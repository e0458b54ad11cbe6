//! Directory-backed snapshot store
//!
//! Each snapshot lives in `<dir>/<hex id>.snap`. Files are written to a
//! temporary name and renamed into place, and an existing file for an id is
//! never rewritten.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vantage_shared::types::performance::CrudePerformance;

use super::{decode_verified, encode, record_store, SnapshotId, SnapshotStore, StoreError};

const SNAPSHOT_EXTENSION: &str = "snap";

/// Snapshot store persisting to a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!("Created snapshot directory {}", dir.display());
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding snapshot `id`
    pub fn snapshot_path(&self, id: &SnapshotId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, SNAPSHOT_EXTENSION))
    }

    fn write(&self, snapshot: &CrudePerformance) -> (Result<SnapshotId, StoreError>, usize) {
        let (id, bytes) = match encode(snapshot) {
            Ok(encoded) => encoded,
            Err(e) => return (Err(e), 0),
        };
        let path = self.snapshot_path(&id);
        if path.exists() {
            debug!("Snapshot {} already stored at {}", id, path.display());
            return (Ok(id), bytes.len());
        }

        let tmp = path.with_extension(format!("{}.tmp", SNAPSHOT_EXTENSION));
        let result = fs::write(&tmp, &bytes)
            .and_then(|_| fs::rename(&tmp, &path))
            .map(|_| id)
            .map_err(StoreError::from);
        if result.is_ok() {
            debug!("Wrote snapshot {} ({} bytes)", id, bytes.len());
        } else {
            let _ = fs::remove_file(&tmp);
        }
        (result, bytes.len())
    }
}

impl SnapshotStore for FileStore {
    fn store(&self, snapshot: &CrudePerformance) -> Result<SnapshotId, StoreError> {
        let (result, len) = self.write(snapshot);
        record_store(&result, len);
        result
    }

    fn resolve(&self, id: &SnapshotId) -> Result<CrudePerformance, StoreError> {
        let path = self.snapshot_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };
        decode_verified(id, &bytes)
    }
}
