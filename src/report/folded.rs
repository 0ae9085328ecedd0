use crate::constants::{Band, MJD};
use crate::detections::ObjectDetections;
use crate::ppem_errors::PpemError;

use super::{Figure, Panel, PlotStyle, Series};

/// Phase of an epoch folded with `period`: `(mjd mod period) / period`, in `[0, 1)`.
///
/// The modulo follows the sign of the period, so epochs before the origin fold into
/// `[0, 1)` as well.
#[inline]
pub fn fold_phase(mjd: MJD, period: f64) -> f64 {
    mjd.rem_euclid(period) / period
}

/// One band of a folded light curve.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedBand {
    pub band: Band,
    pub period: f64,
    pub phase: Vec<f64>,
    /// Corrected magnitudes.
    pub mag: Vec<f64>,
    /// Corrected magnitude errors.
    pub err: Vec<f64>,
}

impl FoldedBand {
    /// Axis label `Phase @ {frequency} [1/d], {period} [d]`, five decimals each.
    pub fn axis_label(&self) -> String {
        format!("Phase @ {:.5} [1/d], {:.5} [d]", 1.0 / self.period, self.period)
    }
}

/// Folded light curve of one object, one entry per requested band.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedCurveFigure {
    pub oid: String,
    pub catalog_period: Option<f64>,
    pub bands: Vec<FoldedBand>,
}

impl FoldedCurveFigure {
    /// Fold every requested band of `object` with its own period.
    ///
    /// Arguments
    /// -----------------
    /// * `object` – detections of the object.
    /// * `catalog_period` – catalog period, kept for display.
    /// * `band_periods` – `(band, period)` pairs, folded in the given order.
    ///
    /// Return
    /// ----------
    /// * `Err(PpemError::InvalidParameter)` for a period that is not finite and positive.
    pub fn new(
        object: &ObjectDetections,
        catalog_period: Option<f64>,
        band_periods: &[(Band, f64)],
    ) -> Result<Self, PpemError> {
        let mut bands = Vec::with_capacity(band_periods.len());
        for &(band, period) in band_periods {
            if !(period.is_finite() && period > 0.0) {
                return Err(PpemError::InvalidParameter(format!(
                    "cannot fold {} band {band} with period {period}",
                    object.oid()
                )));
            }
            let detections = object.band(band);
            bands.push(FoldedBand {
                band,
                period,
                phase: detections.iter().map(|d| fold_phase(d.mjd, period)).collect(),
                mag: detections.iter().map(|d| d.magpsf_corr).collect(),
                err: detections.iter().map(|d| d.sigmapsf_corr_ext).collect(),
            });
        }
        Ok(FoldedCurveFigure {
            oid: object.oid().to_string(),
            catalog_period,
            bands,
        })
    }

    /// One panel per band: error bars in the band color, magnitude axis inverted.
    pub fn to_figure(&self, style: &PlotStyle) -> Figure {
        let panels = self
            .bands
            .iter()
            .map(|b| Panel {
                title: format!("{} {}-band folded curve", self.oid, b.band),
                x_label: b.axis_label(),
                y_label: "Magnitude".into(),
                invert_y: true,
                series: vec![Series {
                    label: b.band.to_string(),
                    x: b.phase.clone(),
                    y: b.mag.iter().copied().map(Some).collect(),
                    y_err: Some(b.err.clone()),
                    format: ".".into(),
                    color: Some(b.band.color().into()),
                }],
                ..Panel::default()
            })
            .collect();

        Figure {
            size: (style.fig_size.0, style.fig_size.1 / 2.0),
            panels,
            share_x: false,
            share_y: false,
        }
    }
}

#[cfg(test)]
mod folded_test {
    use approx::assert_relative_eq;

    use super::*;
    use crate::detections::test_detections::det;

    #[test]
    fn test_fold_phase() {
        assert_relative_eq!(fold_phase(10.25, 0.5), 0.5);
        assert_relative_eq!(fold_phase(3.0, 2.0), 0.5);
        assert_relative_eq!(fold_phase(-0.5, 2.0), 0.75);
        assert!(fold_phase(58000.123, 0.337) < 1.0);
    }

    #[test]
    fn test_folded_figure() {
        let rows = vec![
            det("ZTF_A", 1, 1.0, 1, 0.1),
            det("ZTF_A", 2, 1.5, 2, 0.2),
            det("ZTF_A", 3, 2.25, 1, 0.1),
        ];
        let obj = ObjectDetections::new("ZTF_A", rows).unwrap();
        let folded =
            FoldedCurveFigure::new(&obj, Some(0.5), &[(Band::Green, 1.0), (Band::Red, 0.5)])
                .unwrap();

        assert_eq!(folded.bands[0].phase, vec![0.0, 0.25]);
        assert_eq!(folded.bands[1].err, vec![0.2]);
        assert_eq!(folded.bands[1].axis_label(), "Phase @ 2.00000 [1/d], 0.50000 [d]");

        let fig = folded.to_figure(&PlotStyle::default());
        assert_eq!(fig.panels[0].title, "ZTF_A g-band folded curve");
        assert!(fig.panels[1].invert_y);
        assert_eq!(fig.panels[1].series[0].color.as_deref(), Some("red"));
    }

    #[test]
    fn test_rejects_bad_period() {
        let obj = ObjectDetections::empty("x");
        assert!(FoldedCurveFigure::new(&obj, None, &[(Band::Green, 0.0)]).is_err());
    }
}
