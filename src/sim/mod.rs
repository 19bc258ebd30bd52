//! The simulator collaborator boundary.
//!
//! All unit dynamics, settling behavior, and learning-rule internals live
//! inside an external simulation engine. This crate only ever talks to that
//! engine through the [`Simulator`] trait: build layers and projections,
//! clamp patterns, advance cycles, trigger learning, observe activations,
//! and persist state. Keeping the boundary a trait lets the whole training
//! flow run against [`recording::RecordingSim`] in tests, with no real
//! engine present.

pub mod recording;

use ndarray::{Array1, ArrayView1};
use std::path::Path;
use thiserror::Error;

/// Errors produced at the simulator boundary.
#[derive(Error, Debug)]
pub enum SimError {
    /// Referenced a layer name the network does not have.
    #[error("unknown layer: {0}")]
    UnknownLayer(String),

    /// A layer with this name already exists.
    #[error("duplicate layer: {0}")]
    DuplicateLayer(String),

    /// A clamped pattern does not match the layer's unit count.
    #[error("pattern length {got} does not match layer \"{layer}\" size {want}")]
    ShapeMismatch {
        layer: String,
        want: usize,
        got: usize,
    },

    /// Snapshot could not be written or read back.
    #[error("snapshot failed: {0}")]
    Snapshot(String),

    /// Engine-internal failure (numeric errors, resource exhaustion, ...).
    #[error("engine error: {0}")]
    Engine(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// Behavioral parameters for a layer, handed to the engine untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// Number of units in the layer.
    pub size: usize,
    /// Activation gain.
    pub gain: f32,
    /// Inhibitory conductance for the layer's pool.
    pub inhibition: f32,
}

/// Parameters for a projection between two named layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSpec {
    /// Lower bound of the uniform weight-initialization range.
    pub weight_low: f32,
    /// Upper bound of the uniform weight-initialization range.
    pub weight_high: f32,
    /// Learning rate applied by the engine's weight update.
    pub lrate: f32,
    /// Relative weight scale of this projection against its siblings.
    pub wt_scale_rel: f32,
}

/// Capability set of the external simulation engine.
///
/// The orchestration layer never inspects unit or weight state directly;
/// everything goes through these operations. Shape and name validation is
/// the engine's job — callers clamp whatever they were given and let a
/// mismatch surface as [`SimError`].
pub trait Simulator {
    /// Add a named layer with the given behavioral parameters.
    fn add_layer(&mut self, name: &str, spec: &LayerSpec) -> SimResult<()>;

    /// Add a named projection from `from` to `to`.
    fn connect(&mut self, from: &str, to: &str, spec: &ProjectionSpec) -> SimResult<()>;

    /// Pin a layer's activations to an external pattern. The pattern stays
    /// applied across cycles until [`Simulator::unclamp`] releases it.
    fn clamp(&mut self, layer: &str, pattern: ArrayView1<'_, f32>) -> SimResult<()>;

    /// Release a previously clamped layer. Its activations keep their last
    /// values and evolve freely on subsequent cycles.
    fn unclamp(&mut self, layer: &str) -> SimResult<()>;

    /// Advance the simulation by one settling cycle.
    fn cycle(&mut self) -> SimResult<()>;

    /// Apply the engine's accumulated local weight update.
    fn learn(&mut self) -> SimResult<()>;

    /// Signal an epoch boundary for engine-internal bookkeeping.
    fn end_epoch(&mut self) -> SimResult<()>;

    /// Observe a layer's current per-unit activation values.
    fn activations(&self, layer: &str) -> SimResult<Array1<f32>>;

    /// Persist the full network state to durable storage.
    fn save(&self, path: &Path) -> SimResult<()>;

    /// Restore network state from a snapshot written by [`Simulator::save`].
    fn load(&mut self, path: &Path) -> SimResult<()>;
}
