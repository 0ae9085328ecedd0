//! # Sampling objects of a class
//!
//! Select, in tag order, the first objects whose light curves are rich enough for period
//! estimation, and keep them together with their tags.
//!
//! ## Overview
//! -----------------
//! [`select_objects`] walks the candidate ids **in the order given** (no shuffling):
//!
//! 1. query the detection store;
//! 2. unless `include_noisy`, drop detections whose corrected error is outside
//!    `(0, max_sigma]`;
//! 3. reject the object if the green or the red band holds fewer than `min_detections`
//!    detections (a rejection does not consume a slot);
//! 4. stop as soon as `target_count` objects are accepted.
//!
//! Running out of ids before the target is reached is not an error: the returned set is
//! simply smaller. A store failure skips the id, but if **every** query failed the store is
//! considered unreachable and [`PpemError::StoreUnavailable`] is returned.
//!
//! [`ClassSample`] bundles a sampled [`DetectionSet`] with its tags and runs the
//! estimation and folding steps on it.
//!
//! ## Example
//! -----------------
//! ```rust
//! use ppem::detections::{Detection, ObjectDetections};
//! use ppem::sampling::{select_objects, SamplingParams};
//! use ppem::store::MemoryStore;
//!
//! let rows = |oid: &str| -> Vec<Detection> {
//!     (0..4).map(|i| Detection {
//!         oid: oid.into(),
//!         candid: i,
//!         mjd: 58000.0 + i as f64,
//!         fid: 1 + (i % 2) as u8,
//!         magpsf: 17.0,
//!         sigmapsf: 0.05,
//!         magpsf_corr: 17.0,
//!         sigmapsf_corr_ext: 0.05,
//!     }).collect()
//! };
//! let mut store = MemoryStore::new();
//! store.insert(ObjectDetections::new("A", rows("A")).unwrap());
//! store.insert(ObjectDetections::new("B", rows("B")).unwrap());
//!
//! let params = SamplingParams::builder().target_count(1).min_detections(2).build().unwrap();
//! let sample = select_objects(&store, &["A", "B"], &params).unwrap();
//! assert_eq!(sample.object_ids(), vec!["A".to_string()]);
//! ```
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    Band, FastHashSet, Magnitude, DEFAULT_MAX_SIGMA, DEFAULT_MIN_DETECTIONS, DEFAULT_TARGET_COUNT,
};
use crate::detections::DetectionSet;
use crate::estimation::batch::{run_batch, ResultsTable};
use crate::estimation::EstimationParams;
use crate::periodogram::{Method, PeriodogramEngine};
use crate::ppem_errors::PpemError;
use crate::progress_bar::Progress;
use crate::report::FoldedCurveFigure;
use crate::store::DetectionStore;
use crate::tags::TagSet;

/// Selection thresholds of a class sample.
///
/// Defaults
/// -----------------
/// * `target_count`: 100
/// * `min_detections`: 10 per band
/// * `include_noisy`: false
/// * `max_sigma`: 1.0 mag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Number of objects to accept.
    pub target_count: usize,
    /// Minimum detections required in each band, after noise filtering.
    pub min_detections: usize,
    /// Keep detections regardless of their corrected error.
    pub include_noisy: bool,
    /// Largest corrected error kept when filtering noisy detections.
    pub max_sigma: Magnitude,
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            target_count: DEFAULT_TARGET_COUNT,
            min_detections: DEFAULT_MIN_DETECTIONS,
            include_noisy: false,
            max_sigma: DEFAULT_MAX_SIGMA,
        }
    }
}

impl SamplingParams {
    pub fn builder() -> SamplingParamsBuilder {
        SamplingParamsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), PpemError> {
        if self.target_count == 0 {
            return Err(PpemError::InvalidParameter("target_count must be >= 1".into()));
        }
        if !(self.max_sigma.is_finite() && self.max_sigma > 0.0) {
            return Err(PpemError::InvalidParameter("max_sigma must be finite and > 0".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SamplingParamsBuilder {
    params: SamplingParams,
}

impl SamplingParamsBuilder {
    pub fn target_count(mut self, v: usize) -> Self {
        self.params.target_count = v;
        self
    }

    pub fn min_detections(mut self, v: usize) -> Self {
        self.params.min_detections = v;
        self
    }

    pub fn include_noisy(mut self, v: bool) -> Self {
        self.params.include_noisy = v;
        self
    }

    pub fn max_sigma(mut self, v: Magnitude) -> Self {
        self.params.max_sigma = v;
        self
    }

    pub fn build(self) -> Result<SamplingParams, PpemError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

/// Select up to `target_count` objects with enough clean detections in both bands.
///
/// Arguments
/// -----------------
/// * `store` – source of the detections.
/// * `tagged_ids` – candidate object ids, visited in order. Repeated ids are visited once.
/// * `params` – selection thresholds.
///
/// Return
/// ----------
/// * The accepted objects, in visiting order; at most `target_count` of them.
/// * `Err(PpemError::InvalidParameter)` if `params` is invalid.
/// * `Err(PpemError::StoreUnavailable)` if at least one id was visited and every query
///   failed.
pub fn select_objects<S, I>(
    store: &S,
    tagged_ids: &[I],
    params: &SamplingParams,
) -> Result<DetectionSet, PpemError>
where
    S: DetectionStore + ?Sized,
    I: AsRef<str>,
{
    params.validate()?;

    let mut accepted = DetectionSet::new();
    let mut visited: FastHashSet<&str> = FastHashSet::default();
    let mut attempted = 0usize;
    let mut failed = 0usize;
    let mut last_error = None;
    let mut progress = Progress::new(params.target_count as u64);

    for oid in tagged_ids.iter().map(|id| id.as_ref()) {
        if accepted.len() >= params.target_count {
            break;
        }
        if !visited.insert(oid) {
            continue;
        }

        attempted += 1;
        let object = match store.query(oid) {
            Ok(object) => object,
            Err(e) => {
                warn!("Skipping {oid}: {e}");
                failed += 1;
                last_error = Some(e.to_string());
                continue;
            }
        };

        let object = if params.include_noisy {
            object
        } else {
            object.without_noisy(params.max_sigma)
        };

        if let Err(reason) = object.require_band_counts(params.min_detections) {
            debug!("Rejecting {oid}: {reason}");
            continue;
        }

        accepted.insert(object);
        progress.inc();
    }
    progress.finish();

    if attempted > 0 && failed == attempted {
        return Err(PpemError::StoreUnavailable {
            attempted,
            last_error: last_error.unwrap_or_default(),
        });
    }

    info!(
        "Sampled {}/{} objects ({attempted} queried, {failed} store failures)",
        accepted.len(),
        params.target_count
    );
    Ok(accepted)
}

/// Sampled objects of one variability class and their tags.
#[derive(Debug, Clone)]
pub struct ClassSample {
    class: String,
    objects: DetectionSet,
    tags: TagSet,
}

impl ClassSample {
    /// Sample a class from a store, visiting the objects in tag order.
    ///
    /// The tags of the sample are those of the accepted objects, in sample order.
    pub fn from_store<S>(
        class: impl Into<String>,
        store: &S,
        tags: &TagSet,
        params: &SamplingParams,
    ) -> Result<Self, PpemError>
    where
        S: DetectionStore + ?Sized,
    {
        let class = class.into();
        info!("Sampling class {class}");
        let objects = select_objects(store, &tags.ids(), params)?;
        let tags = tags.subset(&objects.object_ids())?;
        Ok(ClassSample {
            class,
            objects,
            tags,
        })
    }

    /// Reuse a persisted sample.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::MissingTag)` if an object of `objects` has no tag.
    pub fn from_parts(
        class: impl Into<String>,
        objects: DetectionSet,
        tags: &TagSet,
    ) -> Result<Self, PpemError> {
        let tags = tags.subset(&objects.object_ids())?;
        Ok(ClassSample {
            class: class.into(),
            objects,
            tags,
        })
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn objects(&self) -> &DetectionSet {
        &self.objects
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Estimate the periods of every object with every method and attach the tags.
    ///
    /// See also
    /// ------------
    /// * [`run_batch`] – The underlying batch driver.
    pub fn compute_periods<E>(
        &self,
        engine: &E,
        methods: &[Method],
        params: &EstimationParams,
    ) -> Result<ResultsTable, PpemError>
    where
        E: PeriodogramEngine + ?Sized,
    {
        params.validate()?;
        info!(
            "Estimating periods of {} {} objects with {} methods",
            self.objects.len(),
            self.class,
            methods.len()
        );
        run_batch(engine, &self.objects, methods, params).with_tags(&self.tags)
    }

    /// Fold the light curve of one object with a period per band.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::ObjectNotFound)` if `oid` is not part of the sample.
    pub fn folded_curve(
        &self,
        oid: &str,
        band_periods: &[(Band, f64)],
    ) -> Result<FoldedCurveFigure, PpemError> {
        let object = self
            .objects
            .get(oid)
            .ok_or_else(|| PpemError::ObjectNotFound(oid.to_string()))?;
        let catalog_period = self.tags.get(oid).and_then(|t| t.period);
        debug!("Folding {oid}: catalog period {catalog_period:?}, bands {band_periods:?}");
        FoldedCurveFigure::new(object, catalog_period, band_periods)
    }
}
