//! Network topology declaration.
//!
//! Declares the three-layer input/hidden/output topology with feed-forward
//! projections input→hidden and hidden→output and a weaker feedback
//! projection output→hidden. Actual graph and weight construction is the
//! engine's job; this module only hands it the specs.

use tracing::debug;

use crate::sim::{LayerSpec, ProjectionSpec, SimResult, Simulator};

/// Name of the input layer.
pub const INPUT: &str = "input";
/// Name of the hidden layer.
pub const HIDDEN: &str = "hidden";
/// Name of the output layer.
pub const OUTPUT: &str = "output";

/// Activation gain applied to every layer.
const UNIT_GAIN: f32 = 100.0;
/// Inhibitory conductance applied to every layer's pool.
const LAYER_INHIBITION: f32 = 1.8;

/// Relative weight scale of the feedback projection. Forward projections
/// carry scale 1.0; the top-down pathway is deliberately weaker so it
/// biases rather than drives the hidden layer.
pub const FEEDBACK_SCALE: f32 = 0.2;

/// Layer sizes and learning rate for a three-layer network.
#[derive(Debug, Clone, PartialEq)]
pub struct NetSpec {
    pub input: usize,
    pub hidden: usize,
    pub output: usize,
    pub lrate: f32,
}

impl NetSpec {
    #[must_use]
    pub fn new(input: usize, hidden: usize, output: usize, lrate: f32) -> Self {
        Self {
            input,
            hidden,
            output,
            lrate,
        }
    }

    /// Size the hidden layer as the geometric mean of input and output:
    /// `floor(sqrt(input * output))`.
    #[must_use]
    pub fn with_hidden_heuristic(input: usize, output: usize, lrate: f32) -> Self {
        #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
        let hidden = ((input * output) as f64).sqrt().floor() as usize;
        Self::new(input, hidden, output, lrate)
    }
}

/// Behavioral parameters shared by all three layers.
#[must_use]
pub fn layer_spec(size: usize) -> LayerSpec {
    LayerSpec {
        size,
        gain: UNIT_GAIN,
        inhibition: LAYER_INHIBITION,
    }
}

/// Feed-forward projection: uniform random weights in [0.25, 0.75],
/// full relative scale.
#[must_use]
pub fn forward_spec(lrate: f32) -> ProjectionSpec {
    ProjectionSpec {
        weight_low: 0.25,
        weight_high: 0.75,
        lrate,
        wt_scale_rel: 1.0,
    }
}

/// Feedback projection: uniform random weights in [0.25, 0.5], reduced
/// relative scale, same learning rate as the forward pathway.
#[must_use]
pub fn feedback_spec(lrate: f32) -> ProjectionSpec {
    ProjectionSpec {
        weight_low: 0.25,
        weight_high: 0.5,
        lrate,
        wt_scale_rel: FEEDBACK_SCALE,
    }
}

/// Declare the layers and projections of a three-layer network on `sim`.
///
/// Sizes must be positive; beyond that, validation is left to the engine.
///
/// # Errors
///
/// Propagates any engine rejection unmodified.
pub fn build<S: Simulator>(sim: &mut S, spec: &NetSpec) -> SimResult<()> {
    debug!(
        input = spec.input,
        hidden = spec.hidden,
        output = spec.output,
        lrate = spec.lrate,
        "building network"
    );

    sim.add_layer(INPUT, &layer_spec(spec.input))?;
    sim.add_layer(HIDDEN, &layer_spec(spec.hidden))?;
    sim.add_layer(OUTPUT, &layer_spec(spec.output))?;

    sim.connect(INPUT, HIDDEN, &forward_spec(spec.lrate))?;
    sim.connect(HIDDEN, OUTPUT, &forward_spec(spec.lrate))?;
    sim.connect(OUTPUT, HIDDEN, &feedback_spec(spec.lrate))?;

    Ok(())
}
