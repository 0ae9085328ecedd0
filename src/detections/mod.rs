//! # Detections: photometric samples grouped by object
//!
//! The survey delivers light curves as flat rows of **detections** (one photometric
//! measurement each). This module groups them per object and exposes the band partitions the
//! estimation layer works on.
//!
//! Data Model
//! -----------------
//! * [`Detection`] – one measurement, immutable once fetched. Field names match the survey
//!   schema (`oid`, `candid`, `mjd`, `fid`, `magpsf`, `sigmapsf`, `magpsf_corr`,
//!   `sigmapsf_corr_ext`) and are used verbatim as tabular column names.
//! * [`ObjectDetections`] – the ordered detections of a **single** object. Construction
//!   enforces that every row carries the same object id.
//! * [`DetectionSet`] – insertion-ordered collection of [`ObjectDetections`] with an
//!   `oid → position` index. It is the output of sampling and the input of batch estimation.
//!
//! Noise Filtering
//! -----------------
//! [`ObjectDetections::without_noisy`] keeps detections whose corrected error lies in
//! `(0, max_sigma]`. Missing corrected errors are read as `NaN` and are always discarded.
//!
//! Persistence
//! -----------------
//! See [`detection_file`] for CSV load/save of a [`DetectionSet`].
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{Band, Candid, FastHashMap, Magnitude, ObjectId, MJD};
use crate::ppem_errors::PpemError;

pub mod detection_file;

/// A single photometric measurement of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub oid: ObjectId,
    /// Detection id; older exports name this column `candoid`.
    #[serde(alias = "candoid")]
    pub candid: Candid,
    pub mjd: MJD,
    /// Survey filter id (1 = green, 2 = red).
    pub fid: u8,
    #[serde(deserialize_with = "f64_or_nan")]
    pub magpsf: Magnitude,
    #[serde(deserialize_with = "f64_or_nan")]
    pub sigmapsf: Magnitude,
    #[serde(deserialize_with = "f64_or_nan")]
    pub magpsf_corr: Magnitude,
    #[serde(deserialize_with = "f64_or_nan")]
    pub sigmapsf_corr_ext: Magnitude,
}

/// Empty numeric cells (SQL `NULL` exported to CSV) are read as `NaN`.
fn f64_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(f64::NAN))
}

impl Detection {
    /// Band of the detection, `None` when the filter is neither green nor red.
    #[inline]
    pub fn band(&self) -> Option<Band> {
        Band::from_fid(self.fid)
    }

    /// Return true when the corrected error lies in `(0, max_sigma]`.
    #[inline]
    pub fn is_clean(&self, max_sigma: Magnitude) -> bool {
        self.sigmapsf_corr_ext > 0.0 && self.sigmapsf_corr_ext <= max_sigma
    }
}

/// Ordered detections of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDetections {
    oid: ObjectId,
    detections: Vec<Detection>,
}

impl ObjectDetections {
    /// Group detections under `oid`.
    ///
    /// Arguments
    /// -----------------
    /// * `oid` – identifier every detection must carry.
    /// * `detections` – rows in the order delivered by the store.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::MixedObjectIds)` if any row belongs to another object.
    pub fn new(oid: impl Into<ObjectId>, detections: Vec<Detection>) -> Result<Self, PpemError> {
        let oid = oid.into();
        if let Some(other) = detections.iter().find(|d| d.oid != oid) {
            return Err(PpemError::MixedObjectIds {
                expected: oid,
                found: other.oid.clone(),
            });
        }
        Ok(ObjectDetections { oid, detections })
    }

    /// An object with no detection at all (what a store returns for an unknown id).
    pub fn empty(oid: impl Into<ObjectId>) -> Self {
        ObjectDetections {
            oid: oid.into(),
            detections: Vec::new(),
        }
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Detections of one band, in store order.
    pub fn band(&self, band: Band) -> Vec<&Detection> {
        self.detections
            .iter()
            .filter(|d| d.band() == Some(band))
            .collect()
    }

    /// Number of detections in `band`.
    pub fn count(&self, band: Band) -> usize {
        self.detections
            .iter()
            .filter(|d| d.band() == Some(band))
            .count()
    }

    /// Drop detections whose corrected error is outside `(0, max_sigma]`.
    pub fn without_noisy(mut self, max_sigma: Magnitude) -> Self {
        self.detections.retain(|d| d.is_clean(max_sigma));
        self
    }

    /// Check that both bands hold at least `min_detections` rows.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::InsufficientData)` naming the first band below the threshold.
    pub fn require_band_counts(&self, min_detections: usize) -> Result<(), PpemError> {
        for band in Band::ALL {
            let count = self.count(band);
            if count < min_detections {
                return Err(PpemError::InsufficientData {
                    oid: self.oid.clone(),
                    band,
                    count,
                    required: min_detections,
                });
            }
        }
        Ok(())
    }

    pub fn into_detections(self) -> Vec<Detection> {
        self.detections
    }
}

/// Insertion-ordered set of objects and their detections.
///
/// Iteration order is the order in which objects were inserted, which for a sampled set is
/// the order of the tag list. Inserting an object id already present replaces its detections
/// in place and keeps its position.
#[derive(Debug, Clone, Default)]
pub struct DetectionSet {
    objects: Vec<ObjectDetections>,
    index: FastHashMap<ObjectId, usize>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object, replacing a previous entry with the same id.
    pub fn insert(&mut self, object: ObjectDetections) {
        match self.index.get(object.oid()) {
            Some(&pos) => self.objects[pos] = object,
            None => {
                self.index.insert(object.oid.clone(), self.objects.len());
                self.objects.push(object);
            }
        }
    }

    /// Group flat detection rows by object id, in order of first appearance.
    pub fn from_detections<I>(detections: I) -> Self
    where
        I: IntoIterator<Item = Detection>,
    {
        let mut set = DetectionSet::new();
        set.extend_detections(detections);
        set
    }

    /// Append flat detection rows, creating objects as they first appear.
    pub fn extend_detections<I>(&mut self, detections: I)
    where
        I: IntoIterator<Item = Detection>,
    {
        for det in detections {
            match self.index.get(&det.oid) {
                Some(&pos) => self.objects[pos].detections.push(det),
                None => {
                    let oid = det.oid.clone();
                    self.index.insert(oid.clone(), self.objects.len());
                    self.objects.push(ObjectDetections {
                        oid,
                        detections: vec![det],
                    });
                }
            }
        }
    }

    pub fn get(&self, oid: &str) -> Option<&ObjectDetections> {
        self.index.get(oid).map(|&pos| &self.objects[pos])
    }

    pub fn contains(&self, oid: &str) -> bool {
        self.index.contains_key(oid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectDetections> {
        self.objects.iter()
    }

    /// Object ids in insertion order.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|o| o.oid.clone()).collect()
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of detections across all objects.
    pub fn total_detections(&self) -> usize {
        self.objects.iter().map(ObjectDetections::len).sum()
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a ObjectDetections;
    type IntoIter = std::slice::Iter<'a, ObjectDetections>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

#[cfg(test)]
pub(crate) mod test_detections {
    use super::*;

    pub(crate) fn det(oid: &str, candid: Candid, mjd: MJD, fid: u8, sigma: f64) -> Detection {
        Detection {
            oid: oid.to_string(),
            candid,
            mjd,
            fid,
            magpsf: 17.0,
            sigmapsf: 0.05,
            magpsf_corr: 16.9,
            sigmapsf_corr_ext: sigma,
        }
    }

    #[test]
    fn test_mixed_ids_rejected() {
        let rows = vec![det("a", 1, 1.0, 1, 0.1), det("b", 2, 2.0, 2, 0.1)];
        let err = ObjectDetections::new("a", rows).unwrap_err();
        assert!(matches!(
            err,
            PpemError::MixedObjectIds { ref expected, ref found } if expected == "a" && found == "b"
        ));
    }

    #[test]
    fn test_band_partition_ignores_other_filters() {
        let rows = vec![
            det("a", 1, 1.0, 1, 0.1),
            det("a", 2, 2.0, 2, 0.1),
            det("a", 3, 3.0, 3, 0.1),
            det("a", 4, 4.0, 1, 0.1),
        ];
        let obj = ObjectDetections::new("a", rows).unwrap();
        assert_eq!(obj.count(Band::Green), 2);
        assert_eq!(obj.count(Band::Red), 1);
        assert_eq!(obj.band(Band::Green)[1].candid, 4);
    }

    #[test]
    fn test_noise_filter_bounds() {
        let rows = vec![
            det("a", 1, 1.0, 1, 0.0),
            det("a", 2, 2.0, 1, 0.5),
            det("a", 3, 3.0, 1, 1.0),
            det("a", 4, 4.0, 1, 1.2),
            det("a", 5, 5.0, 1, -0.1),
            det("a", 6, 6.0, 1, f64::NAN),
        ];
        let obj = ObjectDetections::new("a", rows).unwrap().without_noisy(1.0);
        let kept: Vec<Candid> = obj.detections().iter().map(|d| d.candid).collect();
        assert_eq!(kept, vec![2, 3]);
    }

    #[test]
    fn test_require_band_counts() {
        let rows = vec![
            det("a", 1, 1.0, 1, 0.1),
            det("a", 2, 2.0, 1, 0.1),
            det("a", 3, 3.0, 2, 0.1),
        ];
        let obj = ObjectDetections::new("a", rows).unwrap();
        assert!(obj.require_band_counts(1).is_ok());
        let err = obj.require_band_counts(2).unwrap_err();
        assert!(matches!(
            err,
            PpemError::InsufficientData {
                band: Band::Red,
                count: 1,
                required: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_detection_set_keeps_first_seen_order() {
        let set = DetectionSet::from_detections(vec![
            det("b", 1, 1.0, 1, 0.1),
            det("a", 2, 1.0, 1, 0.1),
            det("b", 3, 2.0, 2, 0.1),
        ]);
        assert_eq!(set.object_ids(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(set.get("b").unwrap().len(), 2);
        assert_eq!(set.total_detections(), 3);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut set = DetectionSet::new();
        set.insert(ObjectDetections::empty("a"));
        set.insert(ObjectDetections::empty("b"));
        set.insert(ObjectDetections::new("a", vec![det("a", 9, 1.0, 1, 0.1)]).unwrap());
        assert_eq!(set.object_ids(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(set.get("a").unwrap().len(), 1);
    }
}
