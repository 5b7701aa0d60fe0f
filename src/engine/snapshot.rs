//! Index snapshots.
//!
//! A snapshot is a point-in-time serialization of every live product
//! record, sufficient to rebuild the vector store, similarity index and
//! catalog identically. Tombstoned entries are never written, so a
//! snapshot/restore cycle doubles as compaction.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::Metadata;
use crate::error::{CalyxError, Result};
use crate::vector::core::distance::DistanceMetric;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One serialized product record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// A point-in-time serialization of the full index state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub records: Vec<SnapshotRecord>,
}

impl IndexSnapshot {
    pub fn new(dimension: usize, metric: DistanceMetric, records: Vec<SnapshotRecord>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            dimension,
            metric,
            records,
        }
    }

    /// Check the format version and that every record matches the
    /// snapshot's own dimension. Restoring also re-checks against the
    /// target engine's configuration.
    pub fn validate(&self) -> Result<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CalyxError::snapshot(format!(
                "snapshot version mismatch: expected {SNAPSHOT_VERSION}, found {}",
                self.version
            )));
        }
        for record in &self.records {
            if record.vector.len() != self.dimension {
                return Err(CalyxError::snapshot(format!(
                    "record '{}' has dimension {}, snapshot declares {}",
                    record.id,
                    record.vector.len(),
                    self.dimension
                )));
            }
            if record.vector.iter().any(|v| !v.is_finite()) {
                return Err(CalyxError::snapshot(format!(
                    "record '{}' contains non-finite components",
                    record.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_writer(&self, writer: impl Write) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let snapshot: IndexSnapshot = serde_json::from_reader(reader)
            .map_err(|err| CalyxError::snapshot(format!("corrupt snapshot: {err}")))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Write the snapshot to a file atomically (write to a temp sibling,
    /// then rename over the target).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            self.to_writer(&mut writer)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load and validate a snapshot from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}
