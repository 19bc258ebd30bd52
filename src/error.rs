//! Crate-level error types.

use thiserror::Error;

use crate::sim::SimError;

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the orchestration layer.
///
/// Everything here is fatal: this is a batch offline training run, so
/// failures abort the run rather than being retried or recovered.
#[derive(Error, Debug)]
pub enum Error {
    /// The simulator collaborator rejected or failed an operation.
    #[error("simulator error: {0}")]
    Sim(#[from] SimError),

    /// A required dataset file is missing.
    #[error("dataset unavailable: {0}")]
    DataUnavailable(String),

    /// Feature and label sequences have different lengths.
    #[error("sample count mismatch: {features} feature rows vs {labels} label rows")]
    SampleMismatch { features: usize, labels: usize },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics table serialization error
    #[error("metrics serialization error: {0}")]
    Csv(#[from] csv::Error),
}
