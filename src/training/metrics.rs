//! Evaluation metrics and the per-run metrics table.

use ndarray::ArrayView1;
use serde::Serialize;
use std::path::Path;

use crate::data::Dataset;
use crate::error::Result;
use crate::predict::{argmax, predict};
use crate::sim::{SimResult, Simulator};

/// Metrics from one evaluated epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f32,
    pub train_accuracy: f32,
    pub test_loss: f32,
    pub test_accuracy: f32,
}

/// Append-only table of evaluated epochs, one row per evaluation.
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    records: Vec<EpochRecord>,
}

impl MetricsTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the table as CSV, one row per evaluated epoch.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or a row cannot be serialized.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Mean squared error between a prediction and its one-hot label.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mse(prediction: ArrayView1<'_, f32>, label: ArrayView1<'_, f32>) -> f32 {
    let n = prediction.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f32 = prediction
        .iter()
        .zip(label.iter())
        .map(|(p, l)| (p - l) * (p - l))
        .sum();
    sum / n as f32
}

/// Evaluate a dataset: mean MSE and exact-match accuracy of one-hot
/// predictions against one-hot labels.
///
/// Runs the inference path only; the engine's learning step is never
/// invoked from here, so evaluation cannot corrupt weights.
///
/// # Errors
///
/// Propagates engine failures from the prediction path.
pub fn evaluate<S: Simulator>(
    sim: &mut S,
    data: &Dataset,
    cycles: usize,
) -> SimResult<(f32, f32)> {
    if data.is_empty() {
        return Ok((0.0, 0.0));
    }

    let mut loss_sum = 0.0f32;
    let mut correct = 0usize;
    for (input, label) in data.iter() {
        let prediction = predict(sim, input, cycles)?;
        loss_sum += mse(prediction.view(), label);
        if argmax(prediction.view()) == argmax(label) {
            correct += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let n = data.len() as f32;
    Ok((loss_sum / n, correct as f32 / n))
}
