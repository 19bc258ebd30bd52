//! Inference: free-running settling and arg-max readout.
//!
//! Prediction clamps only the input layer and never touches the learning
//! path, so evaluating a network cannot perturb its weights.

use ndarray::{Array1, Array2, ArrayView1};

use crate::net::{INPUT, OUTPUT};
use crate::sim::{SimResult, Simulator};

/// Index of the maximum value. Ties break to the first occurrence, which
/// is the observed behavior of the reference numeric stack rather than a
/// documented guarantee; see `DESIGN.md`.
#[must_use]
pub fn argmax(v: ArrayView1<'_, f32>) -> usize {
    let mut best_idx = 0;
    let mut best_val = f32::NEG_INFINITY;
    for (i, &x) in v.iter().enumerate() {
        if x > best_val {
            best_val = x;
            best_idx = i;
        }
    }
    best_idx
}

/// One-hot vector selecting the arg-max of `v`.
///
/// The result sums to exactly 1 for any non-empty activation vector
/// without NaNs.
#[must_use]
pub fn one_hot_argmax(v: ArrayView1<'_, f32>) -> Array1<f32> {
    let mut out = Array1::zeros(v.len());
    if !v.is_empty() {
        out[argmax(v)] = 1.0;
    }
    out
}

/// Predict the class of a single input pattern.
///
/// Clamps the input layer, free-runs exactly `cycles` settling cycles with
/// the output unclamped (this is inference, not training), releases the
/// clamp, and reads the output layer into a one-hot arg-max decision.
///
/// # Errors
///
/// Propagates any engine rejection (unknown layer, shape mismatch)
/// unmodified.
pub fn predict<S: Simulator>(
    sim: &mut S,
    input: ArrayView1<'_, f32>,
    cycles: usize,
) -> SimResult<Array1<f32>> {
    sim.clamp(INPUT, input)?;
    for _ in 0..cycles {
        sim.cycle()?;
    }
    sim.unclamp(INPUT)?;

    let activity = sim.activations(OUTPUT)?;
    Ok(one_hot_argmax(activity.view()))
}

/// Predict every row of `inputs` independently.
///
/// Samples do not interact; row `i` of the result is the prediction for
/// row `i` of the input.
///
/// # Errors
///
/// Fails on the first sample the engine rejects.
pub fn predict_batch<S: Simulator>(
    sim: &mut S,
    inputs: &Array2<f32>,
    cycles: usize,
) -> SimResult<Array2<f32>> {
    let classes = sim.activations(OUTPUT)?.len();
    let mut out = Array2::zeros((inputs.nrows(), classes));
    for (row, mut slot) in inputs.outer_iter().zip(out.outer_iter_mut()) {
        let prediction = predict(sim, row, cycles)?;
        slot.assign(&prediction);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{build, NetSpec};
    use crate::sim::recording::{Op, RecordingSim};
    use ndarray::array;

    fn small_net() -> RecordingSim {
        let mut sim = RecordingSim::new();
        build(&mut sim, &NetSpec::new(3, 2, 4, 0.05)).unwrap();
        sim
    }

    #[test]
    fn test_argmax_first_occurrence_tie_break() {
        assert_eq!(argmax(array![0.0, 1.0, 1.0, 0.5].view()), 1);
        assert_eq!(argmax(array![2.0, 2.0].view()), 0);
        assert_eq!(argmax(array![-1.0, -3.0].view()), 0);
    }

    #[test]
    fn test_one_hot_argmax_sums_to_one() {
        let v = array![0.1, 0.9, 0.3];
        let one_hot = one_hot_argmax(v.view());
        assert_eq!(one_hot, array![0.0, 1.0, 0.0]);
        assert_eq!(one_hot.sum(), 1.0);
    }

    #[test]
    fn test_predict_runs_free_cycles_and_unclamps() {
        let mut sim = small_net();
        sim.set_activations("output", &array![0.1, 0.2, 0.9, 0.0])
            .unwrap();

        let prediction = predict(&mut sim, array![1.0, 0.0, 1.0].view(), 50).unwrap();
        assert_eq!(prediction, array![0.0, 0.0, 1.0, 0.0]);

        // Exactly 50 cycles ran, the output was never clamped, and no
        // learning was triggered from the inference path.
        assert_eq!(sim.cycles_run(), 50);
        assert_eq!(sim.learn_steps(), 0);
        assert!(!sim.is_clamped("input").unwrap());
        assert!(!sim
            .ops()
            .iter()
            .any(|op| matches!(op, Op::Clamp(l) if l == "output")));
    }

    #[test]
    fn test_predict_batch_preserves_order() {
        let mut sim = small_net();
        sim.set_activations("output", &array![0.0, 1.0, 0.0, 0.0])
            .unwrap();

        let inputs = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        let predictions = predict_batch(&mut sim, &inputs, 10).unwrap();

        assert_eq!(predictions.shape(), &[3, 4]);
        for row in predictions.outer_iter() {
            assert_eq!(row.sum(), 1.0);
            assert_eq!(row[1], 1.0);
        }
        assert_eq!(sim.cycles_run(), 30);
    }

    #[test]
    fn test_predict_wrong_length_pattern_fails() {
        let mut sim = small_net();
        assert!(predict(&mut sim, array![1.0, 0.0].view(), 5).is_err());
    }
}
