//! # Run configuration
//!
//! A complete evaluation run can be described in one JSON file. Every section is optional and
//! falls back to its defaults:
//!
//! ```json
//! {
//!   "methods": ["PDM1", "AOV", "MHAOV"],
//!   "sampling": { "target_count": 50, "min_detections": 20 },
//!   "estimation": { "n_samples": 30, "multiband": false,
//!                   "grid": { "fmax": 10.0 } },
//!   "sample_sizes": [10, 20, 30],
//!   "plot": { "font_size": 12.0 }
//! }
//! ```
use std::fs::File;
use std::io::BufReader;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::estimation::EstimationParams;
use crate::periodogram::Method;
use crate::ppem_errors::PpemError;
use crate::report::PlotStyle;
use crate::sampling::SamplingParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Methods to evaluate, in column order.
    pub methods: Vec<Method>,
    pub sampling: SamplingParams,
    pub estimation: EstimationParams,
    /// Subsample sizes of the tiers compared in summaries and figures.
    pub sample_sizes: Vec<usize>,
    pub plot: PlotStyle,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            methods: Method::ALL.to_vec(),
            sampling: SamplingParams::default(),
            estimation: EstimationParams::default(),
            sample_sizes: Vec::new(),
            plot: PlotStyle::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PpemError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, PpemError> {
        let reader = BufReader::new(File::open(path)?);
        let config: RunConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PpemError> {
        if self.methods.is_empty() {
            return Err(PpemError::InvalidParameter("at least one method is required".into()));
        }
        if self.sample_sizes.contains(&0) {
            return Err(PpemError::InvalidParameter("sample sizes must be >= 1".into()));
        }
        self.sampling.validate()?;
        self.estimation.validate()
    }

    /// Estimation parameters of one sample-size tier.
    pub fn estimation_for(&self, n_samples: usize) -> EstimationParams {
        EstimationParams {
            n_samples: Some(n_samples),
            ..self.estimation.clone()
        }
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RunConfig::from_json_str(
            r#"{ "methods": ["AOV", "MHAOV"],
                 "sampling": { "target_count": 5 },
                 "estimation": { "multiband": true, "grid": { "fmax": 10.0 } } }"#,
        )
        .unwrap();
        assert_eq!(config.methods, vec![Method::Aov, Method::Mhaov]);
        assert_eq!(config.sampling.target_count, 5);
        assert_eq!(config.sampling.min_detections, 10);
        assert!(config.estimation.multiband);
        assert_eq!(config.estimation.grid.fmax, 10.0);
        assert_eq!(config.estimation.grid.fmin, 1e-3);
        assert_eq!(config.estimation.seed, 42);
        assert_eq!(config.plot, PlotStyle::default());
        assert_eq!(config.estimation_for(30).n_samples, Some(30));
    }

    #[test]
    fn test_invalid_values() {
        assert!(RunConfig::from_json_str(r#"{ "methods": [] }"#).is_err());
        assert!(RunConfig::from_json_str(r#"{ "methods": ["GLS"] }"#).is_err());
        assert!(RunConfig::from_json_str(r#"{ "sampling": { "max_sigma": -1.0 } }"#).is_err());
        assert!(RunConfig::from_json_str(r#"{ "sample_sizes": [10, 0] }"#).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("run.json")).unwrap();
        std::fs::write(&path, r#"{ "sample_sizes": [10, 20] }"#).unwrap();
        let config = RunConfig::from_json_file(&path).unwrap();
        assert_eq!(config.sample_sizes, vec![10, 20]);
        assert_eq!(config.methods.len(), 6);
    }
}
