//! Summarize fold scores of several sample-size tiers and dump the hit-rate figure data.
//!
//! ```text
//! cargo run --example score_summary -- [scores_10.csv scores_20.csv ...]
//! ```
//!
//! Score files hold an `oid` column and one integer-coded column per scored series
//! (`0` Wrong, `1` Right, `2` Multiply, `3` Null). Without arguments two small built-in
//! sheets are used.
use std::env;
use std::io;

use camino::Utf8Path;

use ppem::periodogram::Method;
use ppem::ppem_errors::PpemError;
use ppem::report::{hit_rate_figure, CsvPlotter, PlotStyle, Plotter};
use ppem::scoring::samples::summarize_across_samples;
use ppem::scoring::{summarize_hit_rate, ScoreSheet};

const OUTCOMES: [&str; 3] = ["Wrong", "Right", "Multiply"];

const BUILTIN: [&str; 2] = [
    "oid,PDM1_g,PDM1_r,AOV_g,AOV_r\nA,1,1,0,1\nB,0,3,1,1\nC,2,1,1,3\nD,1,0,3,3\n",
    "oid,PDM1_g,PDM1_r,AOV_g,AOV_r\nA,1,1,1,1\nB,1,1,1,1\nC,2,1,1,0\nD,1,3,1,1\n",
];

fn main() -> Result<(), PpemError> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let sheets = if args.is_empty() {
        BUILTIN
            .iter()
            .map(|data| ScoreSheet::read_csv(data.as_bytes(), &OUTCOMES))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        args.iter()
            .map(|path| ScoreSheet::load_csv(Utf8Path::new(path), &OUTCOMES))
            .collect::<Result<Vec<_>, _>>()?
    };

    let pairs = sheets
        .iter()
        .map(|sheet| summarize_hit_rate(sheet, &OUTCOMES))
        .collect::<Result<Vec<_>, _>>()?;

    let (scores, nulls) = summarize_across_samples(&pairs);
    println!("# scores");
    scores.write_csv(io::stdout())?;
    println!("# nulls");
    nulls.write_csv(io::stdout())?;

    let sample_sizes: Vec<usize> = (1..=pairs.len()).map(|i| i * 10).collect();
    let rates: Vec<_> = pairs.into_iter().map(|(rates, _)| rates).collect();
    let style = PlotStyle::default();
    let figure = hit_rate_figure(
        &sample_sizes,
        &rates,
        &rates,
        "Right",
        &[Method::Pdm1, Method::Aov],
        Some(Method::Aov),
        &style,
    )?;

    println!("# hit-rate figure data");
    let mut plotter = CsvPlotter::new(io::stdout())?;
    plotter.render(&figure, &style)
}
