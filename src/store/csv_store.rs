use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ByteRecord, ReaderBuilder};

use super::DetectionStore;
use crate::detections::{Detection, ObjectDetections};
use crate::ppem_errors::PpemError;

/// Detection store backed by a CSV export of the detection table.
///
/// The file is opened at the start of every [`query`](DetectionStore::query) and closed when
/// the call returns. A missing or unreadable file is reported as
/// [`PpemError::StoreConnection`].
#[derive(Debug, Clone)]
pub struct CsvDetectionStore {
    path: Utf8PathBuf,
}

impl CsvDetectionStore {
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        CsvDetectionStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl DetectionStore for CsvDetectionStore {
    /// Stream the file and deserialize only the rows of `oid`.
    ///
    /// A malformed row of another object is skipped; a malformed row of `oid` fails the
    /// query with [`PpemError::Csv`].
    fn query(&self, oid: &str) -> Result<ObjectDetections, PpemError> {
        let connection_error = |reason: String| PpemError::StoreConnection {
            oid: oid.to_string(),
            reason,
        };

        let file = File::open(&self.path)
            .map_err(|e| connection_error(format!("{}: {e}", self.path)))?;
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader
            .byte_headers()
            .map_err(|e| connection_error(e.to_string()))?
            .clone();
        let oid_pos = headers
            .iter()
            .position(|h| h == b"oid")
            .ok_or_else(|| PpemError::MissingColumn("oid".into()))?;

        let mut rows = Vec::new();
        let mut record = ByteRecord::new();
        while reader
            .read_byte_record(&mut record)
            .map_err(|e| connection_error(e.to_string()))?
        {
            if record.get(oid_pos) != Some(oid.as_bytes()) {
                continue;
            }
            rows.push(record.deserialize::<Detection>(Some(&headers))?);
        }
        ObjectDetections::new(oid, rows)
    }
}
