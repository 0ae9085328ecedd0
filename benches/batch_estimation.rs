use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ppem::detections::{Detection, DetectionSet, ObjectDetections};
use ppem::estimation::{batch::run_batch, EstimationParams};
use ppem::periodogram::{FrequencyGrid, LightCurve, Method};
use ppem::ppem_errors::EngineError;

/// Noisy sinusoid sampled at random epochs over ~300 days.
fn random_object(rng: &mut StdRng, oid: &str, n_per_band: usize) -> ObjectDetections {
    let period = rng.random_range(0.3..5.0);
    let mut rows = Vec::with_capacity(2 * n_per_band);
    for fid in [1u8, 2u8] {
        for _ in 0..n_per_band {
            let mjd = 58000.0 + rng.random_range(0.0..300.0);
            let mag = 17.0
                + 0.4 * (std::f64::consts::TAU * mjd / period).sin()
                + rng.random_range(-0.05..0.05);
            rows.push(Detection {
                oid: oid.to_string(),
                candid: rows.len() as i64,
                mjd,
                fid,
                magpsf: mag,
                sigmapsf: 0.05,
                magpsf_corr: mag,
                sigmapsf_corr_ext: 0.05,
            });
        }
    }
    ObjectDetections::new(oid, rows).unwrap()
}

/// Lafler–Kinman string length over a coarse linear grid, a stand-in for a real engine.
fn string_length_engine(
    _method: Method,
    curve: &LightCurve,
    grid: &FrequencyGrid,
) -> Result<f64, EngineError> {
    let n_trials = ((grid.fmax - grid.fmin) / grid.fresolution).ceil() as usize;
    let mut order: Vec<usize> = (0..curve.len()).collect();
    let mut best = (f64::INFINITY, grid.fmin);

    for k in 0..n_trials {
        let f = grid.fmin + k as f64 * grid.fresolution;
        let phase: Vec<f64> = curve.mjd.iter().map(|t| (t * f).fract()).collect();
        order.sort_unstable_by(|&a, &b| phase[a].total_cmp(&phase[b]));
        let length: f64 = order
            .windows(2)
            .map(|w| (curve.mag[w[1]] - curve.mag[w[0]]).powi(2))
            .sum();
        if length < best.0 {
            best = (length, f);
        }
    }
    Ok(best.1)
}

fn bench_run_batch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut set = DetectionSet::new();
    for i in 0..20 {
        set.insert(random_object(&mut rng, &format!("ZTF{i:02}"), 60));
    }

    let grid = FrequencyGrid::builder()
        .fmin(0.1)
        .fmax(5.0)
        .fresolution(5e-3)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("run_batch");
    group.sample_size(10);
    for n_samples in [10usize, 30, 60] {
        let params = EstimationParams::builder()
            .n_samples(n_samples)
            .grid(grid)
            .build()
            .unwrap();
        group.bench_with_input(BenchmarkId::new("single_band", n_samples), &params, |b, p| {
            b.iter(|| run_batch(&string_length_engine, black_box(&set), &[Method::Lksl], p))
        });
    }

    let params = EstimationParams::builder()
        .multiband(true)
        .grid(grid)
        .build()
        .unwrap();
    group.bench_function("multiband/full", |b| {
        b.iter(|| run_batch(&string_length_engine, black_box(&set), &[Method::Mhaov], &params))
    });
    group.finish();
}

criterion_group!(benches, bench_run_batch);
criterion_main!(benches);
