//! # PPEM: period estimation method evaluation
//!
//! Estimate periods of variable stars from survey light curves with several period-search
//! methods, and compare the methods against catalog periods.
//!
//! ## Pipeline
//! -----------------
//! 1. **Sampling** ([`sampling`]) – pick, per variability class, the first tagged objects with
//!    enough clean detections in both bands, from a [`store::DetectionStore`].
//! 2. **Estimation** ([`estimation`]) – run a [`periodogram::PeriodogramEngine`] on every
//!    object, band by band or across bands, optionally on deterministic subsamples.
//! 3. **Batch results** ([`estimation::batch`]) – one typed column per method, exported as
//!    CSV with the `{method}_T_g` style column names.
//! 4. **Scoring** ([`scoring`]) – hit rates, null fractions and per-catalog accuracies from
//!    externally assigned grades.
//! 5. **Figures** ([`report`]) – data for hit-rate, timing and folded-curve plots, rendered by
//!    a [`report::Plotter`] backend.
//!
//! The periodogram algorithms themselves are outside of this crate: any type implementing
//! [`PeriodogramEngine`] (including a plain closure) can be plugged in.
//!
//! ## Cargo features
//! -----------------
//! * `progress` – `indicatif` progress bars during sampling and batch estimation.
//! * `sqlite` – [`store::sqlite_store::SqliteDetectionStore`], a store reading a SQLite
//!   `detection` table.
//!
//! ## Logging
//! -----------------
//! The crate logs through the [`log`] facade; install any logger (e.g. `env_logger`) in the
//! binary to see per-method sections (`info`) and per-object outcomes (`debug`).
pub mod config;
pub mod constants;
pub mod detections;
pub mod estimation;
pub mod periodogram;
pub mod ppem_errors;
pub mod progress_bar;
pub mod report;
pub mod sampling;
pub mod scoring;
pub mod store;
pub mod tags;

pub use config::RunConfig;
pub use constants::Band;
pub use detections::{detection_file::DetectionFile, Detection, DetectionSet, ObjectDetections};
pub use estimation::batch::{run_batch, ResultsTable};
pub use estimation::{estimate_object, get_period, EstimationParams, PeriodEstimate, PeriodFit};
pub use periodogram::{FrequencyGrid, LightCurve, Method, PeriodogramEngine};
pub use ppem_errors::{EngineError, EstimationFailure, PpemError};
pub use sampling::{select_objects, ClassSample, SamplingParams};
pub use scoring::{summarize_hit_rate, Grade, ScoreLabel, ScoreSheet};
pub use store::{DetectionStore, MemoryStore};
pub use tags::{Tag, TagSet};
