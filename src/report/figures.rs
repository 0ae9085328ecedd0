//! Evolution of hit rate and computing time with the number of samples.
//!
//! Both figures have three panels sharing their axes: `G - band`, `R - band` (one series per
//! method, single-band runs) and `All - band` (multiband runs). Each point of a series is one
//! sample-size tier.
use super::{Figure, Panel, PlotStyle, Series};
use crate::constants::Band;
use crate::estimation::batch::ResultsTable;
use crate::periodogram::Method;
use crate::ppem_errors::PpemError;
use crate::scoring::SummaryTable;

const SAMPLES_LABEL: &str = "N° samples";
const MULTIBAND_TITLE: &str = "All - band";

fn band_title(band: Band) -> String {
    format!("{} - band", band.suffix().to_uppercase())
}

fn check_tiers(sample_sizes: &[usize], len: usize, what: &str) -> Result<(), PpemError> {
    if sample_sizes.len() != len {
        return Err(PpemError::InvalidParameter(format!(
            "{} sample sizes for {len} {what}",
            sample_sizes.len()
        )));
    }
    Ok(())
}

/// Assemble the three panels of a per-tier figure.
///
/// `value(tier, method, band)` gives the point of `method` at a tier, `band = None` for the
/// multiband panel.
fn tier_figure<F>(
    sample_sizes: &[usize],
    methods: &[Method],
    multiband_method: Option<Method>,
    style: &PlotStyle,
    y_label: &str,
    configure: impl Fn(&mut Panel),
    value: F,
) -> Figure
where
    F: Fn(usize, Method, Option<Band>) -> Option<f64>,
{
    let x: Vec<f64> = sample_sizes.iter().map(|&n| n as f64).collect();
    let series_of = |method: Method, band: Option<Band>, format: &str| Series {
        label: method.to_string(),
        x: x.clone(),
        y: (0..sample_sizes.len()).map(|t| value(t, method, band)).collect(),
        y_err: None,
        format: format.to_string(),
        color: None,
    };

    let mut panels = Vec::with_capacity(3);
    for band in Band::ALL {
        let mut panel = Panel {
            title: band_title(band),
            x_label: SAMPLES_LABEL.into(),
            y_label: if band == Band::Green { y_label.into() } else { String::new() },
            series: methods
                .iter()
                .enumerate()
                .map(|(i, &m)| series_of(m, Some(band), style.line_format(i)))
                .collect(),
            ..Panel::default()
        };
        configure(&mut panel);
        panels.push(panel);
    }

    let multiband_methods: Vec<Method> = match multiband_method {
        Some(m) => vec![m],
        None => methods.to_vec(),
    };
    let mut all = Panel {
        title: MULTIBAND_TITLE.into(),
        x_label: SAMPLES_LABEL.into(),
        series: multiband_methods
            .iter()
            .map(|&m| series_of(m, None, "-o"))
            .collect(),
        ..Panel::default()
    };
    configure(&mut all);
    panels.push(all);

    Figure {
        size: style.fig_size,
        panels,
        share_x: true,
        share_y: true,
    }
}

/// Hit rate of one criterion against the number of samples.
///
/// Arguments
/// -----------------
/// * `sample_sizes` – number of samples of each tier (x axis).
/// * `single_band` – per tier, the rate table of the single-band runs; series read column
///   `{method}_{g|r}`.
/// * `multi_band` – per tier, the rate table of the multiband runs; series read column
///   `{method}_g`.
/// * `criterion` – rate-table row used as the hit rate (e.g. `"Right"`).
/// * `methods` – methods of the single-band panels, in legend order.
/// * `multiband_method` – `Some(m)` to draw only `m` in the multiband panel, `None` to draw
///   every method of `methods`.
/// * `style` – figure size and line formats.
///
/// Return
/// ----------
/// * A three-panel [`Figure`] with the y axis fixed to `[0, 1]`. Missing table cells are
///   missing points.
/// * `Err(PpemError::InvalidParameter)` if a table list and `sample_sizes` differ in length.
pub fn hit_rate_figure(
    sample_sizes: &[usize],
    single_band: &[SummaryTable],
    multi_band: &[SummaryTable],
    criterion: &str,
    methods: &[Method],
    multiband_method: Option<Method>,
    style: &PlotStyle,
) -> Result<Figure, PpemError> {
    check_tiers(sample_sizes, single_band.len(), "single-band tables")?;
    check_tiers(sample_sizes, multi_band.len(), "multiband tables")?;

    Ok(tier_figure(
        sample_sizes,
        methods,
        multiband_method,
        style,
        "Hit rate",
        |panel| panel.y_limits = Some((0.0, 1.0)),
        |tier, method, band| match band {
            Some(band) => single_band[tier].get(criterion, &format!("{method}_{band}")),
            None => multi_band[tier].get(criterion, &format!("{method}_g")),
        },
    ))
}

/// Mean engine time against the number of samples, on a log scale.
///
/// Arguments
/// -----------------
/// * `sample_sizes` – number of samples of each tier (x axis).
/// * `single_band` / `multi_band` – per tier, the results of the single-band and multiband
///   runs.
/// * `methods`, `multiband_method`, `style` – as in [`hit_rate_figure`].
///
/// See also
/// ------------
/// * [`ResultsTable::mean_time`] – Mean over the rows holding a time.
pub fn time_figure(
    sample_sizes: &[usize],
    single_band: &[ResultsTable],
    multi_band: &[ResultsTable],
    methods: &[Method],
    multiband_method: Option<Method>,
    style: &PlotStyle,
) -> Result<Figure, PpemError> {
    check_tiers(sample_sizes, single_band.len(), "single-band results")?;
    check_tiers(sample_sizes, multi_band.len(), "multiband results")?;

    Ok(tier_figure(
        sample_sizes,
        methods,
        multiband_method,
        style,
        "Time [s]",
        |panel| panel.log_y = true,
        |tier, method, band| match band {
            Some(_) => single_band[tier].mean_time(method, band),
            None => multi_band[tier].mean_time(method, None),
        },
    ))
}

#[cfg(test)]
mod figures_test {
    use super::*;
    use crate::scoring::{summarize_hit_rate, Grade, ScoreSheet};

    fn rates(columns: &[(&str, Vec<Grade>)]) -> SummaryTable {
        let n = columns[0].1.len();
        let mut sheet = ScoreSheet::new((0..n).map(|i| i.to_string()).collect());
        for (name, grades) in columns {
            sheet.push_column(*name, grades.clone()).unwrap();
        }
        summarize_hit_rate(&sheet, &["Wrong", "Right"]).unwrap().0
    }

    #[test]
    fn test_hit_rate_panels() {
        use Grade::*;
        let sb = vec![
            rates(&[
                ("PDM1_g", vec![Criterion(1), Criterion(0)]),
                ("PDM1_r", vec![Criterion(1), Criterion(1)]),
            ]),
            rates(&[("PDM1_g", vec![Criterion(1), Criterion(1)])]),
        ];
        let mb = vec![
            rates(&[("MHAOV_g", vec![Criterion(0), Criterion(1)])]),
            rates(&[("MHAOV_g", vec![Null, Null])]),
        ];
        let fig = hit_rate_figure(
            &[10, 20],
            &sb,
            &mb,
            "Right",
            &[Method::Pdm1],
            Some(Method::Mhaov),
            &PlotStyle::default(),
        )
        .unwrap();

        let titles: Vec<&str> = fig.panels.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["G - band", "R - band", "All - band"]);
        assert!(fig.panels.iter().all(|p| p.y_limits == Some((0.0, 1.0))));

        let g = fig.panel("G - band").unwrap().series("PDM1").unwrap();
        assert_eq!(g.x, vec![10.0, 20.0]);
        assert_eq!(g.y, vec![Some(0.5), Some(1.0)]);
        assert_eq!(g.format, "-o");
        // second tier has no PDM1_r column
        let r = fig.panel("R - band").unwrap().series("PDM1").unwrap();
        assert_eq!(r.y, vec![Some(1.0), None]);

        let all = fig.panel("All - band").unwrap();
        assert_eq!(all.series.len(), 1);
        assert_eq!(all.series[0].y, vec![Some(0.5), None]);
    }

    #[test]
    fn test_tier_count_mismatch() {
        let res = hit_rate_figure(
            &[10],
            &[],
            &[],
            "Right",
            &[Method::Aov],
            None,
            &PlotStyle::default(),
        );
        assert!(matches!(res, Err(PpemError::InvalidParameter(_))));
    }
}
