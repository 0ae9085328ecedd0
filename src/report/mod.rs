//! # Figures of an evaluation
//!
//! The crate does not draw. It prepares **figure data** (panels, series, axis settings) and
//! hands it, together with an explicit [`PlotStyle`], to a [`Plotter`] backend.
//!
//! ## Overview
//! -----------------
//! * [`PlotStyle`] – font, grid, size and line-format cycle of a figure.
//! * [`Figure`] / [`Panel`] / [`Series`] – backend-agnostic figure description.
//! * [`Plotter`] – the renderer trait; [`csv_plotter::CsvPlotter`] dumps series as CSV.
//! * [`figures::hit_rate_figure`] / [`figures::time_figure`] – evolution with the number
//!   of samples, one panel per band plus a multiband panel.
//! * [`folded::FoldedCurveFigure`] – phase-folded light curve of one object.
//!
//! No state is shared between figures: every call receives the style it must use.
use serde::{Deserialize, Serialize};

use crate::ppem_errors::PpemError;

pub mod csv_plotter;
pub mod figures;
pub mod folded;

pub use csv_plotter::CsvPlotter;
pub use figures::{hit_rate_figure, time_figure};
pub use folded::{fold_phase, FoldedBand, FoldedCurveFigure};

/// Appearance of a figure.
///
/// Defaults
/// -----------------
/// * `font_size`: 15, `bold`: true
/// * `grid`: true
/// * `fig_size`: 20 × 10 inches
/// * `line_formats`: `-o -^ -x -8 -* -+ -p`, cycled over the series of a panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub font_size: f64,
    pub bold: bool,
    pub grid: bool,
    pub fig_size: (f64, f64),
    pub line_formats: Vec<String>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            font_size: 15.0,
            bold: true,
            grid: true,
            fig_size: (20.0, 10.0),
            line_formats: ["-o", "-^", "-x", "-8", "-*", "-+", "-p"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl PlotStyle {
    /// Line format of the `i`-th series, cycling over [`PlotStyle::line_formats`].
    pub fn line_format(&self, i: usize) -> &str {
        if self.line_formats.is_empty() {
            "-o"
        } else {
            &self.line_formats[i % self.line_formats.len()]
        }
    }
}

/// One plotted series. `y[i]` is `None` where the value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub x: Vec<f64>,
    pub y: Vec<Option<f64>>,
    pub y_err: Option<Vec<f64>>,
    /// Line format (`"-o"`, `"."`, …).
    pub format: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_limits: Option<(f64, f64)>,
    pub log_y: bool,
    pub invert_y: bool,
    pub series: Vec<Series>,
}

impl Panel {
    pub fn series(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }
}

/// Panels laid out on one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub size: (f64, f64),
    pub panels: Vec<Panel>,
    pub share_x: bool,
    pub share_y: bool,
}

impl Figure {
    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }
}

/// Rendering backend.
pub trait Plotter {
    fn render(&mut self, figure: &Figure, style: &PlotStyle) -> Result<(), PpemError>;
}

impl<P: Plotter + ?Sized> Plotter for &mut P {
    fn render(&mut self, figure: &Figure, style: &PlotStyle) -> Result<(), PpemError> {
        (**self).render(figure, style)
    }
}
