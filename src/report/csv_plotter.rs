use std::io::Write;

use super::{Figure, PlotStyle, Plotter};
use crate::ppem_errors::PpemError;

/// Plotter writing the points of every rendered figure as CSV rows.
///
/// Columns: `figure`, `panel`, `series`, `x`, `y`, `y_err`. Missing values are empty
/// fields. Figures are numbered from 0 in rendering order.
pub struct CsvPlotter<W: Write> {
    writer: csv::Writer<W>,
    rendered: usize,
}

impl<W: Write> CsvPlotter<W> {
    pub fn new(writer: W) -> Result<Self, PpemError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(["figure", "panel", "series", "x", "y", "y_err"])?;
        Ok(CsvPlotter {
            writer,
            rendered: 0,
        })
    }

    /// Number of figures rendered so far.
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn into_inner(self) -> Result<W, PpemError> {
        self.writer
            .into_inner()
            .map_err(|e| PpemError::Plot(e.to_string()))
    }
}

impl<W: Write> Plotter for CsvPlotter<W> {
    fn render(&mut self, figure: &Figure, _style: &PlotStyle) -> Result<(), PpemError> {
        let id = self.rendered.to_string();
        for panel in &figure.panels {
            for series in &panel.series {
                for (i, (x, y)) in series.x.iter().zip(&series.y).enumerate() {
                    let x = x.to_string();
                    let y = y.map(|v| v.to_string()).unwrap_or_default();
                    let err = series
                        .y_err
                        .as_ref()
                        .and_then(|e| e.get(i))
                        .map(|v| v.to_string())
                        .unwrap_or_default();
                    self.writer.write_record([
                        id.as_str(),
                        panel.title.as_str(),
                        series.label.as_str(),
                        x.as_str(),
                        y.as_str(),
                        err.as_str(),
                    ])?;
                }
            }
        }
        self.writer.flush()?;
        self.rendered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod csv_plotter_test {
    use super::*;
    use crate::report::{Panel, Series};

    #[test]
    fn test_dump_missing_points() {
        let figure = Figure {
            size: (20.0, 10.0),
            panels: vec![Panel {
                title: "G - band".into(),
                series: vec![Series {
                    label: "AOV".into(),
                    x: vec![10.0, 20.0],
                    y: vec![Some(0.5), None],
                    y_err: None,
                    format: "-o".into(),
                    color: None,
                }],
                ..Panel::default()
            }],
            share_x: true,
            share_y: true,
        };

        let mut plotter = CsvPlotter::new(Vec::new()).unwrap();
        plotter.render(&figure, &PlotStyle::default()).unwrap();
        assert_eq!(plotter.rendered(), 1);
        let text = String::from_utf8(plotter.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "figure,panel,series,x,y,y_err\n0,G - band,AOV,10,0.5,\n0,G - band,AOV,20,,\n"
        );
    }
}
