//! Run artifact persistence.
//!
//! A finished run leaves two files behind, both named by the run
//! identifier: the metrics table as CSV and the network snapshot written
//! through the simulator's own persistence operation.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::sim::Simulator;
use crate::training::MetricsTable;

/// Path of the metrics CSV for a run.
#[must_use]
pub fn metrics_path(dir: &Path, run_id: &str) -> PathBuf {
    dir.join(format!("{run_id}-metrics.csv"))
}

/// Path of the network snapshot for a run.
#[must_use]
pub fn network_path(dir: &Path, run_id: &str) -> PathBuf {
    dir.join(format!("{run_id}-network.json"))
}

/// Write the metrics table and network snapshot under `dir`.
///
/// # Errors
///
/// Fails if the directory cannot be created, the CSV cannot be written,
/// or the engine's snapshot operation fails.
pub fn persist_run<S: Simulator>(
    sim: &S,
    table: &MetricsTable,
    dir: &Path,
    run_id: &str,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let metrics = metrics_path(dir, run_id);
    table.write_csv(&metrics)?;

    let network = network_path(dir, run_id);
    sim.save(&network)?;

    info!(
        run = run_id,
        metrics = %metrics.display(),
        network = %network.display(),
        "run artifacts written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{build, NetSpec};
    use crate::sim::recording::RecordingSim;
    use crate::training::EpochRecord;
    use std::fs;

    #[test]
    fn test_persist_run_writes_both_artifacts() {
        let mut sim = RecordingSim::new();
        build(&mut sim, &NetSpec::new(2, 2, 2, 0.05)).unwrap();

        let mut table = MetricsTable::new();
        table.push(EpochRecord {
            epoch: 1,
            train_loss: 0.5,
            train_accuracy: 0.5,
            test_loss: 0.5,
            test_accuracy: 0.5,
        });

        let dir = std::env::temp_dir().join("phasic_test_artifacts");
        persist_run(&sim, &table, &dir, "run-007").expect("persist");

        assert!(metrics_path(&dir, "run-007").exists());
        assert!(network_path(&dir, "run-007").exists());

        // Snapshot restores into a fresh stand-in.
        let mut restored = RecordingSim::new();
        restored
            .load(&network_path(&dir, "run-007"))
            .expect("load snapshot");
        assert_eq!(restored.activations("hidden").unwrap().len(), 2);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_artifact_names_carry_run_id() {
        let dir = Path::new("out");
        assert_eq!(
            metrics_path(dir, "mnist-01"),
            Path::new("out/mnist-01-metrics.csv")
        );
        assert_eq!(
            network_path(dir, "mnist-01"),
            Path::new("out/mnist-01-network.json")
        );
    }
}
