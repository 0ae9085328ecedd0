//! # Detection set persistence (CSV)
//!
//! Load and save a [`DetectionSet`] as one delimited text file of detection rows, so that a
//! sampled object set can be reused across runs without querying the detection store again.
//!
//! ## File layout
//! -----------------
//! Header row, then one row per detection:
//!
//! ```text
//! oid,candid,mjd,fid,magpsf,sigmapsf,magpsf_corr,sigmapsf_corr_ext
//! ZTF18aaiopei,1085153894015015004,58859.15,1,17.21,0.06,17.19,0.07
//! ```
//!
//! * `candoid` is accepted as an alias of `candid` when reading.
//! * Empty magnitude cells are read as `NaN`.
//! * Objects appear in order of first appearance; rows keep file order within an object.
//!
//! ## Entry points
//! -----------------
//! The [`DetectionFile`] trait is implemented for [`DetectionSet`]:
//! * `new_from_csv` / `add_from_csv` – read a file path (errors propagated as [`PpemError`]).
//! * `read_csv` / `write_csv` – work on any `io::Read` / `io::Write`.
//! * `save_csv` – write to a file path.
use std::fs::File;
use std::io::{Read, Write};

use camino::Utf8Path;

use super::{Detection, DetectionSet};
use crate::ppem_errors::PpemError;

pub trait DetectionFile: Sized {
    /// Build a new set from a CSV file of detection rows.
    fn new_from_csv(path: &Utf8Path) -> Result<Self, PpemError>;

    /// Append rows of a CSV file to the set.
    fn add_from_csv(&mut self, path: &Utf8Path) -> Result<(), PpemError>;

    /// Build a new set from any reader holding CSV detection rows.
    fn read_csv<R: Read>(reader: R) -> Result<Self, PpemError>;

    /// Write every detection of the set, object by object, as CSV.
    fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError>;

    /// Write the set to a CSV file, truncating any existing file.
    fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError>;
}

fn read_detection_rows<R: Read>(reader: R) -> Result<Vec<Detection>, PpemError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize::<Detection>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

impl DetectionFile for DetectionSet {
    fn new_from_csv(path: &Utf8Path) -> Result<Self, PpemError> {
        let mut set = DetectionSet::new();
        set.add_from_csv(path)?;
        Ok(set)
    }

    fn add_from_csv(&mut self, path: &Utf8Path) -> Result<(), PpemError> {
        let file = File::open(path)?;
        let rows = read_detection_rows(file)?;
        self.extend_detections(rows);
        Ok(())
    }

    fn read_csv<R: Read>(reader: R) -> Result<Self, PpemError> {
        Ok(DetectionSet::from_detections(read_detection_rows(reader)?))
    }

    fn write_csv<W: Write>(&self, writer: W) -> Result<(), PpemError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for object in self.iter() {
            for det in object.detections() {
                csv_writer.serialize(det)?;
            }
        }
        csv_writer.flush()?;
        Ok(())
    }

    fn save_csv(&self, path: &Utf8Path) -> Result<(), PpemError> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}
