// ============================================================
// Layer 2 — ValidateUseCase
// ============================================================
// Orchestrates one evaluation run in order:
//
//   Step 1: Load the YAML config          (Layer 6 - infra)
//   Step 2: Check the dataset type        (Layer 3 - domain)
//   Step 3: Read the three wiring graphs  (Layer 6 - infra)
//   Step 4: Build RandWire                (Layer 5 - ml)
//   Step 5: Restore the checkpoint        (Layer 6 - infra)
//   Step 6: Build the validation loader   (Layer 4 - data)
//   Step 7: Run the validation loop       (Layer 5 - ml)
//
// Step 2 runs before anything heavy: an unsupported dataset
// type must be reported without touching graphs or weights.

use anyhow::{Context, Result};
use burn::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::data::loader::{build_val_loader, load_validation_set};
use crate::domain::{dataset_kind::DatasetKind, graph::Graph};
use crate::infra::{checkpoint::CheckpointStore, graph_reader::read_graph, hparams::HParams};
use crate::ml::{
    model::RandWireConfig,
    validator::{validate, ValidationResult},
};

/// Inputs of one run, as given on the command line.
#[derive(Debug, Clone)]
pub struct ValidateRequest {
    pub config_path:     PathBuf,
    pub checkpoint_path: Option<PathBuf>,
    /// Draw a progress bar on stderr while validating
    pub progress:        bool,
}

/// What a run produces.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub step:    u64,
    pub dataset: DatasetKind,
    pub result:  ValidationResult,
}

pub struct ValidateUseCase {
    request: ValidateRequest,
}

impl ValidateUseCase {
    pub fn new(request: ValidateRequest) -> Self {
        Self { request }
    }

    /// Run the whole pipeline on backend `B`.
    pub fn execute<B: Backend>(&self, device: &B::Device) -> Result<ValidationReport> {
        // ── Step 1: Config ────────────────────────────────────────────────────
        let hp = HParams::load(&self.request.config_path)?;

        // ── Step 2: Dataset type ──────────────────────────────────────────────
        let kind = hp.dataset_kind()?;

        // ── Step 3: Graphs ────────────────────────────────────────────────────
        let graphs = hp
            .graph_paths()
            .into_iter()
            .map(read_graph)
            .collect::<Result<Vec<Graph>>>()?;

        // ── Step 4 + 5: Model and checkpoint ──────────────────────────────────
        tracing::info!("Loading model from checkpoint...");
        let checkpoint_path = self
            .request
            .checkpoint_path
            .as_ref()
            .context("No checkpoint given; pass --checkpoint_path <FILE>")?;

        let model = RandWireConfig::new(kind.channels(), hp.model.channel, hp.model.classes)
            .with_input_maxpool(hp.model.input_maxpool)
            .init::<B>(&graphs, device)?;
        let (model, step) = CheckpointStore::new(checkpoint_path).load(model, device)?;

        // ── Step 6: Validation data ───────────────────────────────────────────
        let val_set = load_validation_set(kind, &hp.data.val)?;
        let dataset_len = burn::data::dataset::Dataset::len(&val_set);
        let batch_size  = hp.data.batch_size;
        let loader = build_val_loader::<B>(val_set, batch_size, hp.data.num_workers, device.clone())?;

        // ── Step 7: Validate ──────────────────────────────────────────────────
        tracing::info!("Validating...");
        let progress = self.progress_bar(dataset_len.div_ceil(batch_size) as u64);
        let result = validate(
            &model,
            loader.iter().inspect(|_| progress.inc(1)),
            dataset_len,
        )?;
        progress.finish_and_clear();

        tracing::info!(
            "Step {}: {}/{} correct on {}",
            step,
            result.correct,
            result.total,
            kind
        );

        Ok(ValidationReport { step, dataset: kind, result })
    }

    fn progress_bar(&self, batches: u64) -> ProgressBar {
        if !self.request.progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(batches);
        if let Ok(style) =
            ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style);
        }
        pb
    }
}
