//! # Periodogram engine interface
//!
//! The period search itself is delegated to an external numeric engine. This module defines
//! what the estimation layer hands to it and what it expects back.
//!
//! ## Overview
//! -----------------
//! * [`Method`] – the supported period-search statistics.
//! * [`LightCurve`] – time / magnitude / error arrays, optionally tagged per band for
//!   multiband searches.
//! * [`FrequencyGrid`] – trial-frequency grid and fine-tuning settings forwarded to the engine.
//! * [`PeriodogramEngine`] – the oracle: evaluate the periodogram and return the best
//!   frequency.
//!
//! The engine only returns a **frequency**; timing and frequency → period conversion are done
//! by [`get_period`](crate::estimation::get_period) so that every engine is measured the same
//! way.
//!
//! ## Implementing an engine
//! -----------------
//! Any closure `Fn(Method, &LightCurve, &FrequencyGrid) -> Result<f64, EngineError>` is an
//! engine:
//!
//! ```rust
//! use ppem::periodogram::{FrequencyGrid, LightCurve, Method, PeriodogramEngine};
//! use ppem::ppem_errors::EngineError;
//!
//! let engine = |_m: Method, curve: &LightCurve, _g: &FrequencyGrid| -> Result<f64, EngineError> {
//!     if curve.is_empty() {
//!         return Err("empty light curve".into());
//!     }
//!     Ok(2.0)
//! };
//! let curve = LightCurve::new(vec![0.0, 0.1], vec![17.0, 17.1], vec![0.1, 0.1]);
//! assert_eq!(engine.best_frequency(Method::Pdm1, &curve, &FrequencyGrid::default()), Ok(2.0));
//! ```
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    Magnitude, DEFAULT_FINETUNE_RESOLUTION, DEFAULT_FMAX, DEFAULT_FMIN, DEFAULT_FRESOLUTION,
    DEFAULT_N_LOCAL_OPTIMA, MJD,
};
use crate::detections::Detection;
use crate::ppem_errors::{EngineError, PpemError};

/// Period-search statistic evaluated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Method {
    /// Phase Dispersion Minimization
    #[serde(rename = "PDM1")]
    Pdm1,
    /// Lafler–Kinman string length
    #[serde(rename = "LKSL")]
    Lksl,
    /// Analysis of Variance
    #[serde(rename = "AOV")]
    Aov,
    /// Orthogonal multiharmonic Analysis of Variance
    #[serde(rename = "MHAOV")]
    Mhaov,
    /// Cauchy–Schwarz Quadratic Mutual Information
    #[serde(rename = "QMICS")]
    Qmics,
    /// Euclidean Quadratic Mutual Information
    #[serde(rename = "QMIEU")]
    Qmieu,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Pdm1,
        Method::Lksl,
        Method::Aov,
        Method::Mhaov,
        Method::Qmics,
        Method::Qmieu,
    ];

    /// Engine-facing name, also used as the column prefix in exported tables.
    pub fn name(self) -> &'static str {
        match self {
            Method::Pdm1 => "PDM1",
            Method::Lksl => "LKSL",
            Method::Aov => "AOV",
            Method::Mhaov => "MHAOV",
            Method::Qmics => "QMICS",
            Method::Qmieu => "QMIEU",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = PpemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| PpemError::UnknownMethod(s.to_string()))
    }
}

/// Arrays handed to the engine for one evaluation.
///
/// Invariant: `mjd`, `mag`, `err` (and `fids` when present) have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightCurve {
    pub mjd: Vec<MJD>,
    pub mag: Vec<Magnitude>,
    pub err: Vec<Magnitude>,
    /// Band tag of every point; `Some` only for multiband evaluations.
    pub fids: Option<Vec<u8>>,
}

impl LightCurve {
    pub fn new(mjd: Vec<MJD>, mag: Vec<Magnitude>, err: Vec<Magnitude>) -> Self {
        debug_assert_eq!(mjd.len(), mag.len(), "mjd/mag length mismatch");
        debug_assert_eq!(mjd.len(), err.len(), "mjd/err length mismatch");
        LightCurve {
            mjd,
            mag,
            err,
            fids: None,
        }
    }

    /// Build the arrays from detections, using the corrected magnitude and error.
    ///
    /// When `tag_bands` is set the filter id of every detection is carried in `fids`.
    pub fn from_detections<'a, I>(detections: I, tag_bands: bool) -> Self
    where
        I: IntoIterator<Item = &'a Detection>,
    {
        let mut curve = LightCurve {
            fids: tag_bands.then(Vec::new),
            ..LightCurve::default()
        };
        for det in detections {
            curve.mjd.push(det.mjd);
            curve.mag.push(det.magpsf_corr);
            curve.err.push(det.sigmapsf_corr_ext);
            if let Some(fids) = curve.fids.as_mut() {
                fids.push(det.fid);
            }
        }
        curve
    }

    pub fn len(&self) -> usize {
        self.mjd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mjd.is_empty()
    }

    pub fn is_multiband(&self) -> bool {
        self.fids.is_some()
    }
}

/// Trial-frequency grid forwarded to the engine.
///
/// Defaults
/// -----------------
/// * `fmin`: 1e-3 1/d
/// * `fmax`: 20.0 1/d
/// * `fresolution`: 1e-3 1/d
/// * `log_period_spacing`: true
/// * `finetune_resolution`: 1e-4 1/d
/// * `n_local_optima`: 10
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyGrid {
    pub fmin: f64,
    pub fmax: f64,
    pub fresolution: f64,
    pub log_period_spacing: bool,
    pub finetune_resolution: f64,
    pub n_local_optima: usize,
}

impl Default for FrequencyGrid {
    fn default() -> Self {
        FrequencyGrid {
            fmin: DEFAULT_FMIN,
            fmax: DEFAULT_FMAX,
            fresolution: DEFAULT_FRESOLUTION,
            log_period_spacing: true,
            finetune_resolution: DEFAULT_FINETUNE_RESOLUTION,
            n_local_optima: DEFAULT_N_LOCAL_OPTIMA,
        }
    }
}

impl FrequencyGrid {
    pub fn builder() -> FrequencyGridBuilder {
        FrequencyGridBuilder::default()
    }

    /// Check the grid bounds.
    ///
    /// * `0 < fmin < fmax`, all finite
    /// * `fresolution > 0`, `finetune_resolution > 0`
    /// * `n_local_optima >= 1`
    pub fn validate(&self) -> Result<(), PpemError> {
        if !(self.fmin.is_finite()
            && self.fmax.is_finite()
            && self.fmin > 0.0
            && self.fmin < self.fmax)
        {
            return Err(PpemError::InvalidParameter("require 0 < fmin < fmax".into()));
        }
        if !(self.fresolution > 0.0) || !(self.finetune_resolution > 0.0) {
            return Err(PpemError::InvalidParameter("grid resolutions must be > 0".into()));
        }
        if self.n_local_optima == 0 {
            return Err(PpemError::InvalidParameter("n_local_optima must be >= 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrequencyGridBuilder {
    grid: FrequencyGrid,
}

impl FrequencyGridBuilder {
    pub fn fmin(mut self, v: f64) -> Self {
        self.grid.fmin = v;
        self
    }

    pub fn fmax(mut self, v: f64) -> Self {
        self.grid.fmax = v;
        self
    }

    pub fn fresolution(mut self, v: f64) -> Self {
        self.grid.fresolution = v;
        self
    }

    pub fn log_period_spacing(mut self, v: bool) -> Self {
        self.grid.log_period_spacing = v;
        self
    }

    pub fn finetune_resolution(mut self, v: f64) -> Self {
        self.grid.finetune_resolution = v;
        self
    }

    pub fn n_local_optima(mut self, v: usize) -> Self {
        self.grid.n_local_optima = v;
        self
    }

    pub fn build(self) -> Result<FrequencyGrid, PpemError> {
        self.grid.validate()?;
        Ok(self.grid)
    }
}

/// External period-search engine.
///
/// Implementations evaluate the periodogram of `curve` for `method` over `grid` and return the
/// best-fit frequency (1/d). A curve with `fids` set must be treated as a multiband search.
/// Any failure is reported as an [`EngineError`]; it is recorded as a missing value by the
/// caller and never retried.
pub trait PeriodogramEngine {
    fn best_frequency(
        &self,
        method: Method,
        curve: &LightCurve,
        grid: &FrequencyGrid,
    ) -> Result<f64, EngineError>;
}

impl<F> PeriodogramEngine for F
where
    F: Fn(Method, &LightCurve, &FrequencyGrid) -> Result<f64, EngineError>,
{
    fn best_frequency(
        &self,
        method: Method,
        curve: &LightCurve,
        grid: &FrequencyGrid,
    ) -> Result<f64, EngineError> {
        self(method, curve, grid)
    }
}

#[cfg(test)]
mod periodogram_test {
    use super::*;
    use crate::detections::test_detections::det;

    #[test]
    fn test_method_names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }
        assert!(matches!(
            "GLS".parse::<Method>(),
            Err(PpemError::UnknownMethod(ref m)) if m == "GLS"
        ));
    }

    #[test]
    fn test_method_serde_name() {
        let json = serde_json::to_string(&Method::Mhaov).unwrap();
        assert_eq!(json, "\"MHAOV\"");
        let back: Method = serde_json::from_str("\"QMIEU\"").unwrap();
        assert_eq!(back, Method::Qmieu);
    }

    #[test]
    fn test_light_curve_uses_corrected_columns() {
        let rows = [det("a", 1, 10.0, 1, 0.1), det("a", 2, 11.0, 2, 0.2)];
        let curve = LightCurve::from_detections(rows.iter(), true);
        assert_eq!(curve.mjd, vec![10.0, 11.0]);
        assert_eq!(curve.mag, vec![16.9, 16.9]);
        assert_eq!(curve.err, vec![0.1, 0.2]);
        assert_eq!(curve.fids, Some(vec![1, 2]));

        let single = LightCurve::from_detections(rows.iter(), false);
        assert!(!single.is_multiband());
    }

    #[test]
    fn test_grid_builder_validation() {
        assert!(FrequencyGrid::builder().build().is_ok());
        assert!(FrequencyGrid::builder().fmin(0.0).build().is_err());
        assert!(FrequencyGrid::builder().fmin(5.0).fmax(1.0).build().is_err());
        assert!(FrequencyGrid::builder().fresolution(-1.0).build().is_err());
        assert!(FrequencyGrid::builder().n_local_optima(0).build().is_err());
    }
}
