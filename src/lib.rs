//! # Phasic
//!
//! A training harness for Leabra-style recurrent networks, driving an
//! external simulation engine through two-phase (minus/plus) settling
//! trials on a thresholded MNIST classification task.
//!
//! ## Overview
//!
//! The harness owns the orchestration only: data binarization, topology
//! declaration, the phase schedule, evaluation, and artifact persistence.
//! Unit dynamics, settling behavior, and the local learning rule live
//! behind the [`Simulator`] trait and are supplied by the engine.
//!
//! Each training trial clamps the input layer, free-runs a fixed number of
//! minus-phase cycles so the network settles into its own expectation,
//! additionally clamps the output layer to the true label for a shorter
//! plus phase, releases both clamps, and asks the engine for one local
//! weight update.
//!
//! ## Structure
//!
//! - [`sim`] — engine capability trait, specs, and a recording stand-in
//! - [`data`] — MNIST binarization and one-hot datasets
//! - [`net`] — three-layer topology declaration
//! - [`training`] — trial/epoch loops, run driver, metrics
//! - [`predict`] — free-running inference with arg-max readout
//! - [`artifacts`] — per-run metrics CSV and network snapshot

pub mod artifacts;
pub mod data;
pub mod error;
pub mod net;
pub mod predict;
pub mod sim;
pub mod training;

pub use artifacts::persist_run;
pub use data::{load_mnist, Dataset, MnistOptions};
pub use error::{Error, Result};
pub use net::{build, NetSpec, HIDDEN, INPUT, OUTPUT};
pub use predict::{predict, predict_batch};
pub use sim::recording::RecordingSim;
pub use sim::{LayerSpec, ProjectionSpec, SimError, Simulator};
pub use training::{evaluate, run_epoch, run_trial, train, EpochRecord, MetricsTable};

/// Cycle schedule and run length for training.
///
/// The minus/plus asymmetry is a fixed hyperparameter of the schedule,
/// never derived from the data. The predictor free-runs for
/// `minus_cycles` as well, keeping inference and the expectation phase in
/// lockstep.
#[derive(Debug, Clone)]
pub struct Config {
    /// Free-running cycles with only the input clamped (expectation phase).
    pub minus_cycles: usize,
    /// Cycles with both input and output clamped (target phase).
    pub plus_cycles: usize,
    /// Number of full passes over the training set.
    pub epochs: usize,
    /// Evaluate and record metrics every this many epochs (1-indexed).
    pub print_freq: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minus_cycles: 50,
            plus_cycles: 25,
            epochs: 50,
            print_freq: 5,
        }
    }
}
