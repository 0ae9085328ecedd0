//! # Batch estimation over a detection set
//!
//! Evaluates every requested [`Method`] on every object of a [`DetectionSet`] and folds the
//! per-object [`PeriodEstimate`]s into a [`ResultsTable`].
//!
//! ## Overview
//! -----------------
//! * The loop is **method-major**: all objects are processed with the first method, then all
//!   objects with the second one, and so on, matching the `---------- PDM1 ----------`
//!   sections printed by earlier runs (now emitted through `log::info!`).
//! * Every method column shares the same object universe: the ids of the input set, in its
//!   order. The join key between columns is therefore the position in the table.
//! * Per-object failures are already resolved into missing slots by
//!   [`estimate_object`]; the driver never aborts a batch.
//!
//! ### Progress UI (feature: `progress`)
//! When compiled with `progress`, each method section renders an `indicatif` bar with the
//! last and smoothed per-object times.
//!
//! ## Example
//! -----------------
//! ```rust
//! use ppem::detections::{Detection, DetectionSet};
//! use ppem::estimation::{batch::run_batch, EstimationParams};
//! use ppem::periodogram::{FrequencyGrid, LightCurve, Method};
//! use ppem::ppem_errors::EngineError;
//!
//! let rows = (0..12).map(|i| Detection {
//!     oid: "ZTF_A".into(),
//!     candid: i,
//!     mjd: 58000.0 + i as f64,
//!     fid: if i % 2 == 0 { 1 } else { 2 },
//!     magpsf: 17.0,
//!     sigmapsf: 0.05,
//!     magpsf_corr: 17.0,
//!     sigmapsf_corr_ext: 0.05,
//! });
//! let objects = DetectionSet::from_detections(rows);
//! let engine = |_: Method, _: &LightCurve, _: &FrequencyGrid| -> Result<f64, EngineError> { Ok(4.0) };
//!
//! let table = run_batch(&engine, &objects, &[Method::Pdm1, Method::Aov], &EstimationParams::default());
//! assert_eq!(table.methods(), &[Method::Pdm1, Method::Aov]);
//! assert_eq!(table.get("ZTF_A", Method::Aov).unwrap().period(Some(ppem::Band::Green)), Some(0.25));
//! ```
use log::{debug, info};

use crate::constants::{Band, FastHashMap, ObjectId, Seconds};
use crate::detections::DetectionSet;
use crate::estimation::{estimate_object, EstimationParams, PeriodEstimate};
use crate::periodogram::{Method, PeriodogramEngine};
use crate::ppem_errors::PpemError;
use crate::progress_bar::{fmt_dur, Progress};
use crate::tags::TagSet;

/// Period estimates of a set of objects for a set of methods.
///
/// One column per method, one row per object. The table is assembled by [`run_batch`] (or
/// loaded back with [`ResultsTable::read_csv`](crate::estimation::results_io)) and read-only
/// afterwards, except for attaching the catalog tags with [`ResultsTable::with_tags`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsTable {
    pub(crate) object_ids: Vec<ObjectId>,
    pub(crate) methods: Vec<Method>,
    pub(crate) multiband: bool,
    /// `columns[m][i]`: estimate of object `object_ids[i]` with method `methods[m]`.
    pub(crate) columns: Vec<Vec<PeriodEstimate>>,
    pub(crate) tags: Option<TagSet>,
    pub(crate) index: FastHashMap<ObjectId, usize>,
}

impl ResultsTable {
    pub(crate) fn with_capacity(object_ids: Vec<ObjectId>, multiband: bool) -> Self {
        let index = object_ids
            .iter()
            .enumerate()
            .map(|(i, oid)| (oid.clone(), i))
            .collect();
        ResultsTable {
            object_ids,
            methods: Vec::new(),
            multiband,
            columns: Vec::new(),
            tags: None,
            index,
        }
    }

    /// Append a full method column. The column must be aligned with `object_ids`.
    pub(crate) fn push_column(&mut self, method: Method, column: Vec<PeriodEstimate>) {
        debug_assert_eq!(column.len(), self.object_ids.len());
        match self.methods.iter().position(|&m| m == method) {
            Some(pos) => self.columns[pos] = column,
            None => {
                self.methods.push(method);
                self.columns.push(column);
            }
        }
    }

    /// Object ids in row order.
    pub fn object_ids(&self) -> &[ObjectId] {
        &self.object_ids
    }

    /// Methods in column order.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn is_multiband(&self) -> bool {
        self.multiband
    }

    pub fn len(&self) -> usize {
        self.object_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_ids.is_empty()
    }

    /// Estimate of one object with one method.
    pub fn get(&self, oid: &str, method: Method) -> Option<&PeriodEstimate> {
        let row = *self.index.get(oid)?;
        let col = self.methods.iter().position(|&m| m == method)?;
        self.columns[col].get(row)
    }

    /// Every estimate of one method, in row order. Empty if the method was not run.
    pub fn column(&self, method: Method) -> Vec<&PeriodEstimate> {
        self.methods
            .iter()
            .position(|&m| m == method)
            .map(|col| self.columns[col].iter().collect())
            .unwrap_or_default()
    }

    /// Attach the catalog tags of the rows, so that exports carry `period` and `source`.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::MissingTag)` if an object of the table has no tag.
    pub fn with_tags(mut self, tags: &TagSet) -> Result<Self, PpemError> {
        self.tags = Some(tags.subset(&self.object_ids)?);
        Ok(self)
    }

    pub fn tags(&self) -> Option<&TagSet> {
        self.tags.as_ref()
    }

    /// Mean engine time of `method`, over the rows where a time was recorded.
    ///
    /// Arguments
    /// -----------------
    /// * `band` – `Some(band)` for a single-band table, `None` for the joint slot of a
    ///   multiband table.
    ///
    /// Return
    /// ----------
    /// * `None` when the method is absent or no row holds a time for that slot.
    pub fn mean_time(&self, method: Method, band: Option<Band>) -> Option<Seconds> {
        let (sum, n) = self
            .column(method)
            .into_iter()
            .filter_map(|est| est.compute_time(band))
            .fold((0.0, 0usize), |(s, n), t| (s + t, n + 1));
        (n > 0).then(|| sum / n as f64)
    }
}

/// Estimate periods for every (method, object) pair.
///
/// Arguments
/// -----------------
/// * `engine` – the periodogram oracle.
/// * `objects` – the objects to process; their order becomes the row order.
/// * `methods` – methods to evaluate; their order becomes the column order. A method listed
///   twice is evaluated once per listing and the later column wins.
/// * `params` – subsampling, search mode, seed and frequency grid shared by every call.
///
/// Return
/// ----------
/// * A [`ResultsTable`] with one column per distinct method. Failed estimations appear as
///   missing slots.
///
/// See also
/// ------------
/// * [`estimate_object`] – The per-object unit of work.
/// * [`ResultsTable::write_csv`] – Tabular export.
pub fn run_batch<E>(
    engine: &E,
    objects: &DetectionSet,
    methods: &[Method],
    params: &EstimationParams,
) -> ResultsTable
where
    E: PeriodogramEngine + ?Sized,
{
    let mut table = ResultsTable::with_capacity(objects.object_ids(), params.multiband);

    for &method in methods {
        info!("{} {method} {}", "-".repeat(10), "-".repeat(10));

        let mut progress = Progress::new(objects.len() as u64);
        let mut failures = 0usize;
        let column: Vec<PeriodEstimate> = objects
            .iter()
            .map(|object| {
                let estimate = estimate_object(engine, object, method, params);
                if estimate.is_total_failure() {
                    failures += 1;
                }
                debug!(
                    "{method} {}: samples g={} r={}, bands={:?}",
                    object.oid(),
                    estimate.samples_g,
                    estimate.samples_r,
                    estimate.bands
                );
                progress.inc();
                estimate
            })
            .collect();

        info!(
            "{method}: {} objects, {failures} without any period, avg {} per object",
            column.len(),
            fmt_dur(progress.avg())
        );
        progress.finish();
        table.push_column(method, column);
    }

    table
}
