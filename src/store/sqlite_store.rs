use camino::{Utf8Path, Utf8PathBuf};
use rusqlite::{Connection, OpenFlags};

use super::DetectionStore;
use crate::detections::{Detection, ObjectDetections};
use crate::ppem_errors::PpemError;

const DETECTION_QUERY: &str = "SELECT oid, candid, mjd, fid, magpsf, sigmapsf, magpsf_corr, sigmapsf_corr_ext \
     FROM detection WHERE oid = ?1";

/// Detection store reading the `detection` table of a SQLite database.
///
/// Each [`query`](DetectionStore::query) opens a read-only connection, runs the select and
/// drops the connection before returning. Failing to open the database is reported as
/// [`PpemError::StoreConnection`]; statement errors are reported as [`PpemError::Sqlite`].
#[derive(Debug, Clone)]
pub struct SqliteDetectionStore {
    path: Utf8PathBuf,
}

impl SqliteDetectionStore {
    pub fn new(path: impl AsRef<Utf8Path>) -> Self {
        SqliteDetectionStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self, oid: &str) -> Result<Connection, PpemError> {
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(|e| {
            PpemError::StoreConnection {
                oid: oid.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

impl DetectionStore for SqliteDetectionStore {
    fn query(&self, oid: &str) -> Result<ObjectDetections, PpemError> {
        let conn = self.connect(oid)?;
        let mut stmt = conn.prepare(DETECTION_QUERY)?;

        let rows = stmt
            .query_map([oid], |row| {
                Ok(Detection {
                    oid: row.get(0)?,
                    candid: row.get(1)?,
                    mjd: row.get(2)?,
                    fid: row.get(3)?,
                    magpsf: row.get::<_, Option<f64>>(4)?.unwrap_or(f64::NAN),
                    sigmapsf: row.get::<_, Option<f64>>(5)?.unwrap_or(f64::NAN),
                    magpsf_corr: row.get::<_, Option<f64>>(6)?.unwrap_or(f64::NAN),
                    sigmapsf_corr_ext: row.get::<_, Option<f64>>(7)?.unwrap_or(f64::NAN),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        ObjectDetections::new(oid, rows)
    }
}
