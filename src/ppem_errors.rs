use thiserror::Error;

use crate::constants::{Band, ObjectId};

#[derive(Error, Debug)]
pub enum PpemError {
    #[error("Detection store unreachable while querying {oid}: {reason}")]
    StoreConnection { oid: ObjectId, reason: String },

    #[error("Detection store unavailable: all {attempted} queries failed (last error: {last_error})")]
    StoreUnavailable {
        attempted: usize,
        last_error: String,
    },

    #[error("Object {oid} has {count} detections in band {band}, {required} required")]
    InsufficientData {
        oid: ObjectId,
        band: Band,
        count: usize,
        required: usize,
    },

    #[error("Detection of object {found} found in the detection set of {expected}")]
    MixedObjectIds { expected: ObjectId, found: ObjectId },

    #[error("No tag found for object: {0}")]
    MissingTag(ObjectId),

    #[error("Object not found in sample: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Unknown period search method: {0}")]
    UnknownMethod(String),

    #[error("Grade {code} in column {column} is outside the {n_criteria} scoring criteria")]
    UnknownGrade {
        column: String,
        code: usize,
        n_criteria: usize,
    },

    #[error("Unknown score label: {0}")]
    UnknownLabel(String),

    #[error("Expected one entry per class ({classes} classes), got {labels} label sets and {tags} tag sets")]
    ClassCountMismatch {
        classes: usize,
        labels: usize,
        tags: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing column in tabular file: {0}")]
    MissingColumn(String),

    #[error("Invalid value {value:?} in column {column}")]
    InvalidCell { column: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON configuration error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Plotting backend failed: {0}")]
    Plot(String),
}

/// Why a single periodogram evaluation produced no period.
///
/// Estimation failures are **recorded** as missing cells by the batch layer; they are never
/// propagated past it and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationFailure {
    #[error("Not enough points for a periodogram: {points} < {required}")]
    InsufficientData { points: usize, required: usize },

    #[error("Periodogram engine returned a degenerate best frequency: {0}")]
    DegenerateFrequency(f64),

    #[error("Periodogram engine failed: {0}")]
    Engine(String),
}

/// Error reported by a [`PeriodogramEngine`](crate::periodogram::PeriodogramEngine) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl From<&str> for EngineError {
    fn from(msg: &str) -> Self {
        EngineError(msg.to_string())
    }
}

impl From<String> for EngineError {
    fn from(msg: String) -> Self {
        EngineError(msg)
    }
}

impl From<EngineError> for EstimationFailure {
    fn from(err: EngineError) -> Self {
        EstimationFailure::Engine(err.0)
    }
}
