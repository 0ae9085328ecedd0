//! Sample a class, estimate periods for each sample-size tier and save the result tables.
//!
//! ```text
//! cargo run --example estimate_class -- [detections.csv tags.csv [run.json]]
//! ```
//!
//! Without arguments a synthetic class of sinusoidal light curves is generated. Set
//! `RUST_LOG=info` (or `debug`) to follow the run.
use std::env;

use camino::{Utf8Path, Utf8PathBuf};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ppem::periodogram::{FrequencyGrid, LightCurve, Method};
use ppem::ppem_errors::{EngineError, PpemError};
use ppem::store::csv_store::CsvDetectionStore;
use ppem::store::{DetectionStore, MemoryStore};
use ppem::{Band, ClassSample, Detection, ObjectDetections, RunConfig, Tag, TagSet};

/// Phase dispersion of the folded curve in 10 bins, minimised over a linear grid.
fn binned_dispersion_engine(
    _method: Method,
    curve: &LightCurve,
    grid: &FrequencyGrid,
) -> Result<f64, EngineError> {
    const BINS: usize = 10;
    let n_trials = ((grid.fmax - grid.fmin) / grid.fresolution).ceil() as usize;
    if n_trials == 0 {
        return Err("empty frequency grid".into());
    }

    let mut best = (f64::INFINITY, grid.fmin);
    for k in 0..n_trials {
        let f = grid.fmin + k as f64 * grid.fresolution;
        let mut sum = [0.0; BINS];
        let mut sum_sq = [0.0; BINS];
        let mut count = [0usize; BINS];
        for (t, m) in curve.mjd.iter().zip(&curve.mag) {
            let bin = (((t * f).rem_euclid(1.0)) * BINS as f64) as usize % BINS;
            sum[bin] += m;
            sum_sq[bin] += m * m;
            count[bin] += 1;
        }
        let dispersion: f64 = (0..BINS)
            .filter(|&b| count[b] > 0)
            .map(|b| sum_sq[b] - sum[b] * sum[b] / count[b] as f64)
            .sum();
        if dispersion < best.0 {
            best = (dispersion, f);
        }
    }
    Ok(best.1)
}

fn synthetic_class(n_objects: usize) -> Result<(MemoryStore, TagSet), PpemError> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut store = MemoryStore::new();
    let mut tags = TagSet::new();

    for i in 0..n_objects {
        let oid = format!("ZTF_SYN{i:03}");
        let period: f64 = rng.random_range(0.3..1.0);
        let mut rows = Vec::new();
        for band in Band::ALL {
            let n = rng.random_range(5..60);
            for _ in 0..n {
                let mjd = 58000.0 + rng.random_range(0.0..200.0);
                let mag = 17.0 + 0.4 * (std::f64::consts::TAU * mjd / period).sin();
                rows.push(Detection {
                    oid: oid.clone(),
                    candid: rows.len() as i64,
                    mjd,
                    fid: band.fid(),
                    magpsf: mag,
                    sigmapsf: 0.05,
                    magpsf_corr: mag + rng.random_range(-0.03..0.03),
                    sigmapsf_corr_ext: rng.random_range(0.01..1.2),
                });
            }
        }
        store.insert(ObjectDetections::new(oid.as_str(), rows)?);
        tags.push(Tag {
            oid,
            period: Some(period),
            source: if i % 3 == 0 { "ASASSN" } else { "CATALINA" }.into(),
            class: Some("RRL".into()),
        });
    }
    Ok((store, tags))
}

/// Sample the class, then estimate and save one result table per sample-size tier.
///
/// Arguments
/// -----------------
/// * `store`: Source of the detections.
/// * `tags`: Ground truth of the class, in sampling order.
/// * `config`: Methods, sampling and estimation parameters.
/// * `out`: Directory receiving `rrl_<n>_samples.csv`.
fn run(
    store: &dyn DetectionStore,
    tags: &TagSet,
    config: &RunConfig,
    out: &Utf8Path,
) -> Result<(), PpemError> {
    let sample = ClassSample::from_store("RRL", store, tags, &config.sampling)?;
    println!("Sampled {} objects", sample.len());

    let tiers = if config.sample_sizes.is_empty() {
        vec![10, 20, 30]
    } else {
        config.sample_sizes.clone()
    };

    for n_samples in tiers {
        let params = config.estimation_for(n_samples);
        let table =
            sample.compute_periods(&binned_dispersion_engine, &config.methods, &params)?;
        let path = out.join(format!("rrl_{n_samples}_samples.csv"));
        table.save_csv(&path)?;

        for method in table.methods() {
            let g = table
                .mean_time(*method, Some(Band::Green))
                .unwrap_or(f64::NAN);
            println!(
                "{n_samples:>3} samples  {:<6} mean g-band time {g:.4}s",
                method.name()
            );
        }
        println!("  -> {path}");
    }

    if let Some(oid) = sample.objects().object_ids().first() {
        let period = sample.tags().get(oid).and_then(|t| t.period).unwrap_or(1.0);
        let folded = sample.folded_curve(oid, &[(Band::Green, period), (Band::Red, period)])?;
        for band in &folded.bands {
            println!(
                "{oid} {}-band: {} points, {}",
                band.band,
                band.phase.len(),
                band.axis_label()
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), PpemError> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let out = Utf8PathBuf::from_path_buf(env::temp_dir())
        .map_err(|p| PpemError::InvalidParameter(format!("non UTF-8 temp dir {p:?}")))?;

    let mut config = match args.get(2) {
        Some(path) => RunConfig::from_json_file(Utf8Path::new(path))?,
        None => RunConfig::default(),
    };

    match (args.first(), args.get(1)) {
        (Some(detections), Some(tags)) => {
            let store = CsvDetectionStore::new(detections);
            let tags = TagSet::load_csv(Utf8Path::new(tags))?;
            run(&store, &tags, &config, &out)
        }
        _ => {
            config.methods = vec![Method::Pdm1, Method::Aov];
            config.sampling.target_count = 10;
            config.sampling.min_detections = 30;
            config.estimation.grid = FrequencyGrid::builder()
                .fmin(0.5)
                .fmax(4.0)
                .fresolution(1e-3)
                .build()?;
            let (store, tags) = synthetic_class(40)?;
            run(&store, &tags, &config, &out)
        }
    }
}
