//! Record Store Adapter
//!
//! Narrow seam to whatever owns booking persistence. The engine only ever
//! asks for the full record set, once, at construction. A JSON snapshot on
//! disk stands in for re-querying the backing store; its format is opaque
//! to retrieval and answer generation.

use std::path::{Path, PathBuf};

use crate::error::QaError;
use crate::types::BookingRecord;

/// Source of the full booking record set.
pub trait RecordSource: Send + Sync {
    fn load_all(&self) -> Result<Vec<BookingRecord>, QaError>;
}

/// Loads records from a serialized snapshot file.
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write a snapshot so later startups skip the backing store.
    pub fn save(&self, records: &[BookingRecord]) -> Result<(), QaError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_vec(records)?;
        std::fs::write(&self.path, serialized)?;
        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "Saved booking snapshot"
        );
        Ok(())
    }
}

impl RecordSource for JsonSnapshotSource {
    fn load_all(&self) -> Result<Vec<BookingRecord>, QaError> {
        let content = std::fs::read(&self.path)?;
        let records: Vec<BookingRecord> = serde_json::from_slice(&content)?;
        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded booking snapshot"
        );
        Ok(records)
    }
}

/// Record source backed by an in-memory vector. Used by tests and by
/// callers that already hold the records.
pub struct InMemorySource {
    records: Vec<BookingRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<BookingRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for InMemorySource {
    fn load_all(&self) -> Result<Vec<BookingRecord>, QaError> {
        Ok(self.records.clone())
    }
}
