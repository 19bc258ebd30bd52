//! An in-memory simulator stand-in for tests.
//!
//! `RecordingSim` implements the full [`Simulator`] capability set without
//! any unit dynamics: a cycle only advances a counter, and learning only
//! records that it was requested. What it does keep faithfully is the
//! observable surface — named layers with activation vectors and clamp
//! flags, projection weight matrices drawn from the configured init
//! ranges, shape validation on clamp, and JSON snapshots — so the
//! orchestration layer can be exercised end to end and its call sequence
//! asserted against the recorded [`Op`] log.

use ndarray::{Array1, Array2, ArrayView1};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{LayerSpec, ProjectionSpec, SimError, SimResult, Simulator};

/// One recorded simulator operation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    AddLayer(String),
    Connect(String, String),
    Clamp(String),
    Unclamp(String),
    Cycle,
    Learn,
    EndEpoch,
}

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    spec: LayerSpec,
    values: Array1<f32>,
    clamped: bool,
}

#[derive(Debug, Clone)]
struct Projection {
    from: String,
    to: String,
    spec: ProjectionSpec,
    weights: Array2<f32>,
}

/// Recording stand-in for an external simulation engine.
#[derive(Debug, Default)]
pub struct RecordingSim {
    layers: Vec<Layer>,
    projections: Vec<Projection>,
    ops: Vec<Op>,
    cycles_run: usize,
    learn_steps: usize,
    epochs_ended: usize,
}

impl RecordingSim {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The full operation log, in call order.
    #[must_use]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Total cycles advanced since construction.
    #[must_use]
    pub fn cycles_run(&self) -> usize {
        self.cycles_run
    }

    /// Number of learning steps requested.
    #[must_use]
    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }

    /// Number of epoch boundaries signalled.
    #[must_use]
    pub fn epochs_ended(&self) -> usize {
        self.epochs_ended
    }

    /// Whether a layer is currently clamped.
    pub fn is_clamped(&self, layer: &str) -> SimResult<bool> {
        self.layer(layer).map(|l| l.clamped)
    }

    /// Weight matrix of the projection `from` → `to`, if connected.
    #[must_use]
    pub fn weights(&self, from: &str, to: &str) -> Option<&Array2<f32>> {
        self.projections
            .iter()
            .find(|p| p.from == from && p.to == to)
            .map(|p| &p.weights)
    }

    /// Spec of the projection `from` → `to`, if connected.
    #[must_use]
    pub fn projection_spec(&self, from: &str, to: &str) -> Option<&ProjectionSpec> {
        self.projections
            .iter()
            .find(|p| p.from == from && p.to == to)
            .map(|p| &p.spec)
    }

    /// Overwrite a layer's activations directly. Test-control backdoor for
    /// scripting what [`Simulator::activations`] will report; not part of
    /// the engine capability set and not recorded in the op log.
    pub fn set_activations(&mut self, layer: &str, values: &Array1<f32>) -> SimResult<()> {
        let l = self.layer_mut(layer)?;
        if values.len() != l.spec.size {
            return Err(SimError::ShapeMismatch {
                layer: l.name.clone(),
                want: l.spec.size,
                got: values.len(),
            });
        }
        l.values.assign(values);
        Ok(())
    }

    fn layer(&self, name: &str) -> SimResult<&Layer> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .ok_or_else(|| SimError::UnknownLayer(name.to_string()))
    }

    fn layer_mut(&mut self, name: &str) -> SimResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| SimError::UnknownLayer(name.to_string()))
    }
}

impl Simulator for RecordingSim {
    fn add_layer(&mut self, name: &str, spec: &LayerSpec) -> SimResult<()> {
        if self.layers.iter().any(|l| l.name == name) {
            return Err(SimError::DuplicateLayer(name.to_string()));
        }
        self.layers.push(Layer {
            name: name.to_string(),
            spec: spec.clone(),
            values: Array1::zeros(spec.size),
            clamped: false,
        });
        self.ops.push(Op::AddLayer(name.to_string()));
        Ok(())
    }

    fn connect(&mut self, from: &str, to: &str, spec: &ProjectionSpec) -> SimResult<()> {
        let from_size = self.layer(from)?.spec.size;
        let to_size = self.layer(to)?.spec.size;
        // Receiving units in rows, matching the snapshot layout.
        let dist = Uniform::new(spec.weight_low, spec.weight_high);
        let weights = Array2::random((to_size, from_size), dist);
        self.projections.push(Projection {
            from: from.to_string(),
            to: to.to_string(),
            spec: spec.clone(),
            weights,
        });
        self.ops.push(Op::Connect(from.to_string(), to.to_string()));
        Ok(())
    }

    fn clamp(&mut self, layer: &str, pattern: ArrayView1<'_, f32>) -> SimResult<()> {
        let l = self.layer_mut(layer)?;
        if pattern.len() != l.spec.size {
            return Err(SimError::ShapeMismatch {
                layer: l.name.clone(),
                want: l.spec.size,
                got: pattern.len(),
            });
        }
        l.values.assign(&pattern);
        l.clamped = true;
        self.ops.push(Op::Clamp(layer.to_string()));
        Ok(())
    }

    fn unclamp(&mut self, layer: &str) -> SimResult<()> {
        let l = self.layer_mut(layer)?;
        l.clamped = false;
        self.ops.push(Op::Unclamp(layer.to_string()));
        Ok(())
    }

    fn cycle(&mut self) -> SimResult<()> {
        self.cycles_run += 1;
        self.ops.push(Op::Cycle);
        Ok(())
    }

    fn learn(&mut self) -> SimResult<()> {
        self.learn_steps += 1;
        self.ops.push(Op::Learn);
        Ok(())
    }

    fn end_epoch(&mut self) -> SimResult<()> {
        self.epochs_ended += 1;
        self.ops.push(Op::EndEpoch);
        Ok(())
    }

    fn activations(&self, layer: &str) -> SimResult<Array1<f32>> {
        self.layer(layer).map(|l| l.values.clone())
    }

    fn save(&self, path: &Path) -> SimResult<()> {
        let data = Snapshot {
            layers: self
                .layers
                .iter()
                .map(|l| LayerSnapshot {
                    name: l.name.clone(),
                    size: l.spec.size,
                    gain: l.spec.gain,
                    inhibition: l.spec.inhibition,
                    values: l.values.to_vec(),
                })
                .collect(),
            projections: self
                .projections
                .iter()
                .map(|p| ProjectionSnapshot {
                    from: p.from.clone(),
                    to: p.to.clone(),
                    lrate: p.spec.lrate,
                    wt_scale_rel: p.spec.wt_scale_rel,
                    weight_low: p.spec.weight_low,
                    weight_high: p.spec.weight_high,
                    weights: array2_to_vecs(&p.weights),
                })
                .collect(),
            cycles_run: self.cycles_run,
            epochs_ended: self.epochs_ended,
        };

        let json = serde_json::to_string_pretty(&data)
            .map_err(|e| SimError::Snapshot(format!("serialize: {e}")))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SimError::Snapshot(format!("create {}: {e}", parent.display())))?;
        }

        std::fs::write(path, json)
            .map_err(|e| SimError::Snapshot(format!("write {}: {e}", path.display())))
    }

    fn load(&mut self, path: &Path) -> SimResult<()> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::Snapshot(format!("read {}: {e}", path.display())))?;
        let data: Snapshot = serde_json::from_str(&json)
            .map_err(|e| SimError::Snapshot(format!("parse {}: {e}", path.display())))?;

        let mut layers = Vec::with_capacity(data.layers.len());
        for l in data.layers {
            if l.values.len() != l.size {
                return Err(SimError::Snapshot(format!(
                    "layer \"{}\" has {} values for {} units",
                    l.name,
                    l.values.len(),
                    l.size
                )));
            }
            layers.push(Layer {
                name: l.name,
                spec: LayerSpec {
                    size: l.size,
                    gain: l.gain,
                    inhibition: l.inhibition,
                },
                values: Array1::from(l.values),
                clamped: false,
            });
        }

        let mut projections = Vec::with_capacity(data.projections.len());
        for p in data.projections {
            projections.push(Projection {
                from: p.from,
                to: p.to,
                spec: ProjectionSpec {
                    weight_low: p.weight_low,
                    weight_high: p.weight_high,
                    lrate: p.lrate,
                    wt_scale_rel: p.wt_scale_rel,
                },
                weights: vecs_to_array2(&p.weights)?,
            });
        }

        self.layers = layers;
        self.projections = projections;
        self.cycles_run = data.cycles_run;
        self.epochs_ended = data.epochs_ended;
        Ok(())
    }
}

/// Serializable snapshot of the recorded network.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    layers: Vec<LayerSnapshot>,
    projections: Vec<ProjectionSnapshot>,
    cycles_run: usize,
    epochs_ended: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct LayerSnapshot {
    name: String,
    size: usize,
    gain: f32,
    inhibition: f32,
    values: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProjectionSnapshot {
    from: String,
    to: String,
    lrate: f32,
    wt_scale_rel: f32,
    weight_low: f32,
    weight_high: f32,
    weights: Vec<Vec<f32>>,
}

/// Convert an Array2 to nested Vecs for serialization.
fn array2_to_vecs(arr: &Array2<f32>) -> Vec<Vec<f32>> {
    arr.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Convert nested Vecs back to an Array2.
fn vecs_to_array2(vecs: &[Vec<f32>]) -> SimResult<Array2<f32>> {
    if vecs.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }
    let nrows = vecs.len();
    let ncols = vecs[0].len();
    let flat: Vec<f32> = vecs.iter().flat_map(|r| r.iter().copied()).collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| SimError::Snapshot(format!("weight matrix shape: {e}")))
}
