// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line, picks the compute backend, hands the
// run to Layer 2 and prints the result.
//
// Standard output carries exactly the three result lines; all
// progress and diagnostics go to stderr through tracing.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use burn::backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu};
use clap::Parser;
use commands::ValidateArgs;

use crate::application::validate_use_case::{ValidateUseCase, ValidationReport};
use crate::infra::metrics::{EvalMetrics, MetricsLogger};

#[derive(Parser, Debug)]
#[command(
    name = "randwire-eval",
    version,
    about = "Evaluate a trained RandWire checkpoint on its validation set."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: ValidateArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let use_case = ValidateUseCase::new((&self.args).into());

        let report = if self.args.cpu {
            let device = NdArrayDevice::default();
            tracing::info!("Using CPU device: {:?}", device);
            use_case.execute::<NdArray>(&device)?
        } else {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            use_case.execute::<Wgpu>(&device)?
        };

        print_report(&report);

        if let Some(dir) = &self.args.metrics_dir {
            let logger = MetricsLogger::new(dir)?;
            logger.log(&EvalMetrics {
                step:     report.step,
                dataset:  report.dataset.to_string(),
                samples:  report.result.total,
                avg_loss: report.result.avg_loss,
                accuracy: report.result.accuracy,
            })?;
            tracing::info!("Appended result to '{}'", logger.csv_path().display());
        }
        Ok(())
    }
}

fn print_report(report: &ValidationReport) {
    println!("Result on step {}:", report.step);
    println!("Average test loss: {:.4}", report.result.avg_loss);
    println!("Accuracy: {:.3}", report.result.accuracy);
}
