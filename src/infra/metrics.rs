// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one row per evaluated checkpoint to a CSV file, so a
// series of checkpoints can be compared or plotted afterwards.
//
// Output file: <metrics-dir>/metrics.csv
//
// Example CSV output:
//   step,dataset,samples,avg_loss,accuracy
//   10000,CIFAR10,10000,0.004321,0.871200
//   20000,CIFAR10,10000,0.003987,0.889400
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// One evaluated checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalMetrics {
    pub step:     u64,
    pub dataset:  String,
    pub samples:  usize,
    pub avg_loss: f64,
    pub accuracy: f64,
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and header if they don't exist yet.
    /// An existing file is appended to across runs.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics dir '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "step,dataset,samples,avg_loss,accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EvalMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{},{:.6},{:.6}",
            m.step, m.dataset, m.samples, m.avg_loss, m.accuracy,
        )?;

        tracing::debug!("Logged step {} metrics to '{}'", m.step, self.csv_path.display());
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
