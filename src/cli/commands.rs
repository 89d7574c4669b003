// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// The flags of the evaluator.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → PathBuf, bool)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;
use std::path::PathBuf;

use crate::application::validate_use_case::ValidateRequest;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// YAML file for configuration
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path of the checkpoint file (.mpk.gz suffix optional)
    #[arg(short = 'p', long = "checkpoint_path")]
    pub checkpoint_path: Option<PathBuf>,

    /// Run on the CPU (ndarray backend) instead of the default GPU device
    #[arg(long)]
    pub cpu: bool,

    /// Append the result to <DIR>/metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

/// Boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<&ValidateArgs> for ValidateRequest {
    fn from(a: &ValidateArgs) -> Self {
        ValidateRequest {
            config_path:     a.config.clone(),
            checkpoint_path: a.checkpoint_path.clone(),
            progress:        !a.quiet,
        }
    }
}
