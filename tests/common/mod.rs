#![allow(dead_code)]

use std::cell::RefCell;

use ppem::constants::Band;
use ppem::detections::{Detection, ObjectDetections};
use ppem::periodogram::{FrequencyGrid, LightCurve, Method, PeriodogramEngine};
use ppem::ppem_errors::EngineError;
use ppem::tags::{Tag, TagSet};

pub const GREEN_SIGMA: f64 = 0.05;
pub const RED_SIGMA: f64 = 0.06;

/// Sinusoidal light curve with `n_g` green and `n_r` red detections.
///
/// Epochs are spaced by 0.37 d. The corrected error tells the band of a point
/// ([`GREEN_SIGMA`] or [`RED_SIGMA`]).
pub fn synthetic_object(oid: &str, n_g: usize, n_r: usize, period: f64) -> ObjectDetections {
    let mut rows = Vec::with_capacity(n_g + n_r);
    for (band, n) in [(Band::Green, n_g), (Band::Red, n_r)] {
        for i in 0..n {
            let mjd = 58000.0 + 0.37 * i as f64 + if band == Band::Red { 0.1 } else { 0.0 };
            let mag = 17.0 + 0.3 * (std::f64::consts::TAU * mjd / period).sin();
            rows.push(Detection {
                oid: oid.to_string(),
                candid: (rows.len() + 1) as i64,
                mjd,
                fid: band.fid(),
                magpsf: mag,
                sigmapsf: 0.05,
                magpsf_corr: mag,
                sigmapsf_corr_ext: if band == Band::Green { GREEN_SIGMA } else { RED_SIGMA },
            });
        }
    }
    ObjectDetections::new(oid, rows).unwrap()
}

pub fn tags_for(entries: &[(&str, f64, &str)]) -> TagSet {
    entries
        .iter()
        .map(|&(oid, period, source)| Tag {
            oid: oid.to_string(),
            period: Some(period),
            source: source.to_string(),
            class: Some("RRL".to_string()),
        })
        .collect()
}

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCall {
    pub method: Method,
    pub points: usize,
    pub bands: Option<Vec<u8>>,
}

/// Engine returning a fixed frequency and recording every call.
///
/// Calls whose curve contains only `fail_on_fid` points, or whose method is `fail_method`,
/// fail.
pub struct ScriptedEngine {
    pub frequency: f64,
    pub fail_on_fid: Option<u8>,
    pub fail_method: Option<Method>,
    pub calls: RefCell<Vec<EngineCall>>,
    /// Band of each single-band call, read from the curve errors.
    pub single_band_fids: RefCell<Vec<u8>>,
}

impl ScriptedEngine {
    pub fn new(frequency: f64) -> Self {
        ScriptedEngine {
            frequency,
            fail_on_fid: None,
            fail_method: None,
            calls: RefCell::new(Vec::new()),
            single_band_fids: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_band(mut self, fid: u8) -> Self {
        self.fail_on_fid = Some(fid);
        self
    }

    pub fn failing_method(mut self, method: Method) -> Self {
        self.fail_method = Some(method);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

fn curve_fid(curve: &LightCurve) -> Option<u8> {
    let err = *curve.err.first()?;
    Some(if err < (GREEN_SIGMA + RED_SIGMA) / 2.0 { 1 } else { 2 })
}

impl PeriodogramEngine for ScriptedEngine {
    fn best_frequency(
        &self,
        method: Method,
        curve: &LightCurve,
        _grid: &FrequencyGrid,
    ) -> Result<f64, EngineError> {
        self.calls.borrow_mut().push(EngineCall {
            method,
            points: curve.len(),
            bands: curve.fids.clone(),
        });
        if self.fail_method == Some(method) {
            return Err(EngineError::from(format!("{method} diverged")));
        }
        if curve.fids.is_none() {
            if let Some(fid) = curve_fid(curve) {
                self.single_band_fids.borrow_mut().push(fid);
                if self.fail_on_fid == Some(fid) {
                    return Err("band rejected".into());
                }
            }
        }
        Ok(self.frequency)
    }
}
