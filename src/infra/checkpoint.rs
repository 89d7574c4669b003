// ============================================================
// Layer 6 — Checkpoint Store
// ============================================================
// Restores trained weights using Burn's file recorders.
//
// What a checkpoint holds:
//   model  — every learned parameter of RandWire
//            (convs, batch-norm stats, aggregation weights, fc)
//   step   — the optimiser step the snapshot was taken at
//
// Format: named MessagePack, gzip compressed, full precision.
// The recorder appends `.mpk.gz` itself, so a path passed with
// or without that suffix points at the same file.
//
// Loading fails if the record does not match the model built
// from the config (different graphs, channel width, classes).
// Burn's load_record takes tensors as stored and drops optional
// parameters missing on either side, so two checks run around it:
//   before  every DAG node has aggregation weights on both sides
//           or on neither
//   after   every tensor kept the shape the config asked for
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{bail, Context, Result};
use burn::{
    module::{ModuleVisitor, ParamId},
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Record, Recorder},
};
use std::path::{Path, PathBuf};

use crate::ml::model::{RandWire, RandWireRecord};

pub type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

const EXTENSION: &str = ".mpk.gz";

#[derive(Record)]
pub struct CheckpointRecord<B: Backend> {
    pub model: RandWireRecord<B>,
    pub step:  u64,
}

/// A checkpoint file on disk.
pub struct CheckpointStore {
    /// Path without the recorder extension
    stem: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let stem = path
            .to_str()
            .and_then(|s| s.strip_suffix(EXTENSION))
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf());
        Self { stem }
    }

    /// Full file name as written by the recorder.
    pub fn file_path(&self) -> PathBuf {
        let mut name = self.stem.clone().into_os_string();
        name.push(EXTENSION);
        PathBuf::from(name)
    }

    /// Load weights into `model` and return it with the stored step.
    pub fn load<B: Backend>(
        &self,
        model:  RandWire<B>,
        device: &B::Device,
    ) -> Result<(RandWire<B>, u64)> {
        let file = self.file_path();
        if !file.exists() {
            bail!("Checkpoint file '{}' not found", file.display());
        }

        let record: CheckpointRecord<B> = CheckpointRecorder::new()
            .load(self.stem.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", file.display()))?;

        let mismatch = || format!("Checkpoint '{}' does not match the configured model", file.display());
        model.check_record(&record.model).with_context(mismatch)?;

        let expected = param_shapes(&model);
        let model = model.load_record(record.model);
        let loaded = param_shapes(&model);
        if expected.len() != loaded.len() {
            bail!("{}: {} tensors expected, {} loaded", mismatch(), expected.len(), loaded.len());
        }
        if let Some((i, (want, got))) =
            expected.iter().zip(&loaded).enumerate().find(|(_, (want, got))| want != got)
        {
            bail!("{}: tensor #{i} has shape {got:?}, expected {want:?}", mismatch());
        }

        tracing::info!("Restored checkpoint '{}' (step {})", file.display(), record.step);
        Ok((model, record.step))
    }

    /// Write `model` and `step`; used to build fixtures.
    #[cfg(test)]
    pub fn save<B: Backend>(&self, model: &RandWire<B>, step: u64) -> Result<()> {
        let record = CheckpointRecord { model: model.clone().into_record(), step };
        CheckpointRecorder::new()
            .record(record, self.stem.clone())
            .with_context(|| format!("Cannot save checkpoint '{}'", self.file_path().display()))?;
        Ok(())
    }
}

/// Shapes of every float tensor of a module, in visiting order.
#[derive(Default)]
struct ParamShapes(Vec<Vec<usize>>);

impl<B: Backend> ModuleVisitor<B> for ParamShapes {
    fn visit_float<const D: usize>(&mut self, _id: ParamId, tensor: &Tensor<B, D>) {
        self.0.push(tensor.dims().to_vec());
    }
}

fn param_shapes<B: Backend, M: Module<B>>(module: &M) -> Vec<Vec<usize>> {
    let mut shapes = ParamShapes::default();
    module.visit(&mut shapes);
    shapes.0
}
