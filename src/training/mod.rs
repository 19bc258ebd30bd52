//! Training loops: per-sample trials, epoch passes, and the run driver.
//!
//! One trial runs the two-phase settling schedule on a single sample:
//!
//! ```text
//! clamp input → minus cycles → clamp output → plus cycles → unclamp → learn
//! ```
//!
//! The minus phase lets the network produce its own best-guess output with
//! only the input pinned; the plus phase additionally pins the true label,
//! starting from the hidden state the minus phase settled into. The error
//! signal between the two phases is the engine's business — the harness
//! only guarantees the schedule.

pub mod metrics;

use ndarray::ArrayView1;
use tracing::{debug, info, info_span};

use crate::data::Dataset;
use crate::net::{INPUT, OUTPUT};
use crate::sim::{SimResult, Simulator};
use crate::Config;

pub use metrics::{evaluate, mse, EpochRecord, MetricsTable};

/// Run one two-phase trial on a single sample and apply a learning step.
///
/// Exactly `config.minus_cycles` cycles run before the output clamp and
/// exactly `config.plus_cycles` after it; both counts are configuration,
/// never data-dependent. Pattern shape checking is left to the engine.
///
/// # Errors
///
/// Propagates engine failures (unknown layer, shape mismatch) unmodified.
pub fn run_trial<S: Simulator>(
    sim: &mut S,
    input: ArrayView1<'_, f32>,
    target: ArrayView1<'_, f32>,
    config: &Config,
) -> SimResult<()> {
    sim.clamp(INPUT, input)?;
    for _ in 0..config.minus_cycles {
        sim.cycle()?;
    }

    sim.clamp(OUTPUT, target)?;
    for _ in 0..config.plus_cycles {
        sim.cycle()?;
    }

    sim.unclamp(INPUT)?;
    sim.unclamp(OUTPUT)?;
    sim.learn()
}

/// Run one trial per sample in insertion order, then signal the epoch
/// boundary.
///
/// No shuffling: every epoch visits the samples in the same order, so
/// runs are deterministic given a fixed dataset. Side effect only — the
/// network is mutated in place.
///
/// # Errors
///
/// Fails on the first sample the engine rejects.
pub fn run_epoch<S: Simulator>(sim: &mut S, data: &Dataset, config: &Config) -> SimResult<()> {
    for (input, target) in data.iter() {
        run_trial(sim, input, target, config)?;
    }
    sim.end_epoch()
}

/// Run the full training schedule and collect the metrics table.
///
/// Every `print_freq`-th epoch (1-indexed, inclusive) both datasets are
/// evaluated through the inference path and one row is appended to the
/// table. Evaluation costs a full prediction pass per sample, so
/// non-evaluation epochs skip it entirely.
///
/// # Errors
///
/// Aborts on the first engine failure; partial metrics are discarded.
pub fn train<S: Simulator>(
    sim: &mut S,
    train_set: &Dataset,
    test_set: &Dataset,
    config: &Config,
) -> SimResult<MetricsTable> {
    let span = info_span!("train", epochs = config.epochs, samples = train_set.len());
    let _guard = span.enter();

    info!(
        minus_cycles = config.minus_cycles,
        plus_cycles = config.plus_cycles,
        print_freq = config.print_freq,
        "run started"
    );

    let mut table = MetricsTable::new();
    for epoch in 1..=config.epochs {
        run_epoch(sim, train_set, config)?;

        if epoch % config.print_freq == 0 {
            let (train_loss, train_accuracy) = evaluate(sim, train_set, config.minus_cycles)?;
            let (test_loss, test_accuracy) = evaluate(sim, test_set, config.minus_cycles)?;

            info!(
                epoch,
                train_loss, train_accuracy, test_loss, test_accuracy, "epoch evaluated"
            );
            table.push(EpochRecord {
                epoch,
                train_loss,
                train_accuracy,
                test_loss,
                test_accuracy,
            });
        } else {
            debug!(epoch, "epoch complete, evaluation skipped");
        }
    }

    info!(evaluated_epochs = table.len(), "run complete");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{build, NetSpec};
    use crate::sim::recording::{Op, RecordingSim};
    use ndarray::array;

    fn config() -> Config {
        Config {
            minus_cycles: 50,
            plus_cycles: 25,
            epochs: 1,
            print_freq: 1,
        }
    }

    fn small_net() -> RecordingSim {
        let mut sim = RecordingSim::new();
        build(&mut sim, &NetSpec::new(2, 2, 2, 0.05)).unwrap();
        sim
    }

    fn two_sample_data() -> Dataset {
        Dataset::new(
            array![[1.0, 0.0], [0.0, 1.0]],
            array![[0.0, 1.0], [1.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_trial_phase_schedule() {
        let mut sim = small_net();
        run_trial(
            &mut sim,
            array![1.0, 0.0].view(),
            array![0.0, 1.0].view(),
            &config(),
        )
        .unwrap();

        let ops = sim.ops();
        let output_clamp = ops
            .iter()
            .position(|op| matches!(op, Op::Clamp(l) if l == OUTPUT))
            .expect("output clamp present");

        // Exactly 50 cycles before the output clamp, 25 after.
        let before = ops[..output_clamp]
            .iter()
            .filter(|op| matches!(op, Op::Cycle))
            .count();
        let after = ops[output_clamp..]
            .iter()
            .filter(|op| matches!(op, Op::Cycle))
            .count();
        assert_eq!(before, 50);
        assert_eq!(after, 25);

        // Both clamps released, then a single learning step, in order.
        let tail = &ops[ops.len() - 3..];
        assert_eq!(
            tail,
            &[Op::Unclamp(INPUT.into()), Op::Unclamp(OUTPUT.into()), Op::Learn]
        );
        assert_eq!(sim.learn_steps(), 1);
    }

    #[test]
    fn test_trial_wrong_pattern_length_propagates() {
        let mut sim = small_net();
        let result = run_trial(
            &mut sim,
            array![1.0, 0.0, 0.0].view(),
            array![0.0, 1.0].view(),
            &config(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_epoch_runs_every_sample_in_order() {
        let mut sim = small_net();
        let data = two_sample_data();
        run_epoch(&mut sim, &data, &config()).unwrap();

        // One learning step per sample, one epoch boundary at the end.
        assert_eq!(sim.learn_steps(), 2);
        assert_eq!(sim.epochs_ended(), 1);
        assert_eq!(sim.ops().last(), Some(&Op::EndEpoch));
        assert_eq!(sim.cycles_run(), 2 * 75);

        // One input clamp per sample.
        let clamps: Vec<_> = sim
            .ops()
            .iter()
            .filter(|op| matches!(op, Op::Clamp(l) if l == INPUT))
            .collect();
        assert_eq!(clamps.len(), 2);
    }

    #[test]
    fn test_driver_appends_row_per_evaluated_epoch() {
        let mut sim = small_net();
        let data = two_sample_data();

        let cfg = Config {
            epochs: 6,
            print_freq: 2,
            ..config()
        };
        let table = train(&mut sim, &data, &data, &cfg).unwrap();

        // Epochs 2, 4, 6 are evaluated.
        assert_eq!(table.len(), 3);
        let epochs: Vec<usize> = table.records().iter().map(|r| r.epoch).collect();
        assert_eq!(epochs, vec![2, 4, 6]);
        assert_eq!(sim.epochs_ended(), 6);
    }

    #[test]
    fn test_driver_learning_only_from_trials() {
        let mut sim = small_net();
        let data = two_sample_data();

        let cfg = Config {
            epochs: 2,
            print_freq: 1,
            ..config()
        };
        train(&mut sim, &data, &data, &cfg).unwrap();

        // 2 epochs × 2 samples: evaluation passes add cycles but never
        // learning steps.
        assert_eq!(sim.learn_steps(), 4);
        let trial_cycles = 4 * 75;
        let eval_cycles = 2 * (2 + 2) * 50;
        assert_eq!(sim.cycles_run(), trial_cycles + eval_cycles);
    }

    #[test]
    fn test_evaluate_accuracy_against_scripted_output() {
        let mut sim = small_net();
        let data = two_sample_data();

        // Output pinned at class 1: correct for the first sample only.
        sim.set_activations(OUTPUT, &array![0.0, 1.0]).unwrap();
        let (loss, accuracy) = evaluate(&mut sim, &data, 10).unwrap();

        assert!((accuracy - 0.5).abs() < 1e-6);
        // Wrong sample disagrees in both one-hot positions: mse 2/2 = 1.0,
        // averaged over two samples.
        assert!((loss - 0.5).abs() < 1e-6);
    }
}
