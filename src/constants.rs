//! # Constants and type definitions for PPEM
//!
//! This module centralizes the **type aliases**, **photometric band identifiers**, and
//! **default tunables** shared by the sampling, estimation, and scoring layers.
//!
//! ## Overview
//!
//! - Core type aliases (`MJD`, `Magnitude`, `ObjectId`, …)
//! - The [`Band`] enum mapping the survey filter ids (`fid`) to green / red
//! - Defaults reproduced by every run (subsampling seed, frequency grid, thresholds)
//! - The [`FastHashMap`] / [`FastHashSet`] aliases used for id lookups in the crate

use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Modified Julian Date (days)
pub type MJD = f64;
/// Apparent magnitude, or a magnitude uncertainty
pub type Magnitude = f64;
/// Wall-clock duration in seconds
pub type Seconds = f64;
/// Survey object identifier (e.g. `ZTF18aaiopei`)
pub type ObjectId = String;
/// Survey detection (candidate) identifier
pub type Candid = i64;

/// Hash map keyed with [`ahash`](https://docs.rs/ahash) for id lookups.
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;
/// Hash set counterpart of [`FastHashMap`].
pub type FastHashSet<T> = HashSet<T, RandomState>;

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------

/// Seed of the per-band subsampling RNG. Every call reuses it so that results are reproducible.
pub const DEFAULT_SEED: u64 = 42;

/// Minimum number of points handed to the periodogram engine.
pub const MIN_ENGINE_POINTS: usize = 3;

/// Default number of accepted objects per class.
pub const DEFAULT_TARGET_COUNT: usize = 100;

/// Default minimum number of detections required in **each** band.
pub const DEFAULT_MIN_DETECTIONS: usize = 10;

/// Default upper bound on the corrected magnitude error (`sigmapsf_corr_ext`).
pub const DEFAULT_MAX_SIGMA: Magnitude = 1.0;

/// Lowest trial frequency (1/d)
pub const DEFAULT_FMIN: f64 = 1e-3;
/// Highest trial frequency (1/d)
pub const DEFAULT_FMAX: f64 = 20.0;
/// Coarse grid resolution (1/d)
pub const DEFAULT_FRESOLUTION: f64 = 1e-3;
/// Fine-tuning resolution around local optima (1/d)
pub const DEFAULT_FINETUNE_RESOLUTION: f64 = 1e-4;
/// Number of local optima refined after the coarse pass
pub const DEFAULT_N_LOCAL_OPTIMA: usize = 10;

// -------------------------------------------------------------------------------------------------
// Bands
// -------------------------------------------------------------------------------------------------

/// Photometric filter of a detection.
///
/// The survey encodes filters as small integers (`fid`): `1` is the green band and `2` the red
/// band. Detections in any other filter are carried through I/O but never enter a band partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    /// `fid = 1`
    Green,
    /// `fid = 2`
    Red,
}

impl Band {
    /// Bands in partition order (green first).
    pub const ALL: [Band; 2] = [Band::Green, Band::Red];

    /// Survey filter id of the band.
    pub fn fid(self) -> u8 {
        match self {
            Band::Green => 1,
            Band::Red => 2,
        }
    }

    /// Map a survey filter id to a band, `None` for filters outside the g/r pair.
    pub fn from_fid(fid: u8) -> Option<Band> {
        match fid {
            1 => Some(Band::Green),
            2 => Some(Band::Red),
            _ => None,
        }
    }

    /// Single-letter suffix used in tabular column names (`g` / `r`).
    pub fn suffix(self) -> &'static str {
        match self {
            Band::Green => "g",
            Band::Red => "r",
        }
    }

    /// Plot color conventionally associated with the band.
    pub fn color(self) -> &'static str {
        match self {
            Band::Green => "green",
            Band::Red => "red",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

#[cfg(test)]
mod band_test {
    use super::*;

    #[test]
    fn test_fid_mapping() {
        assert_eq!(Band::from_fid(1), Some(Band::Green));
        assert_eq!(Band::from_fid(2), Some(Band::Red));
        assert_eq!(Band::from_fid(3), None);
        for band in Band::ALL {
            assert_eq!(Band::from_fid(band.fid()), Some(band));
        }
    }

    #[test]
    fn test_suffix() {
        assert_eq!(Band::Green.to_string(), "g");
        assert_eq!(Band::Red.suffix(), "r");
    }
}
