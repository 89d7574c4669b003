// ============================================================
// Layer 6 — Hyper-parameter Configuration
// ============================================================
// Reads the YAML configuration file that a RandWire run was
// trained with. The same file drives evaluation, so sections
// that only matter for training (`train:`, `log:`, ...) are
// accepted and ignored by serde.
//
// Example:
//   data:
//     type: 'CIFAR10'
//     val: 'dataset/cifar10'
//     batch_size: 128
//     num_workers: 4
//   model:
//     channel: 78
//     classes: 10
//     input_maxpool: false
//     graph0: 'model/graphs/ws-4-075-32.txt'
//     graph1: 'model/graphs/ws-4-075-32.txt'
//     graph2: 'model/graphs/ws-4-075-32.txt'
//
// Reference: serde derive documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::dataset_kind::DatasetKind;

fn default_batch_size()  -> usize { 128 }
fn default_num_workers() -> usize { 1 }

/// Root of the configuration file. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct HParams {
    pub data:  DataParams,
    pub model: ModelParams,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataParams {
    /// Dataset key, one of MNIST / CIFAR10 / ImageNet.
    /// Kept as a string here; checked by `HParams::dataset_kind`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Directory holding the validation split
    pub val: PathBuf,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelParams {
    /// Base channel count C; the DAG stages use 2C, 4C and 8C
    pub channel: usize,
    pub classes: usize,
    #[serde(default)]
    pub input_maxpool: bool,
    pub graph0: PathBuf,
    pub graph1: PathBuf,
    pub graph2: PathBuf,
}

impl HParams {
    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let hp: HParams = serde_yaml::from_str(text)?;
        if hp.data.batch_size == 0 {
            bail!("data.batch_size must be positive");
        }
        Ok(hp)
    }

    pub fn dataset_kind(&self) -> Result<DatasetKind> {
        self.data.kind.parse()
    }

    pub fn graph_paths(&self) -> [&Path; 3] {
        [
            self.model.graph0.as_path(),
            self.model.graph1.as_path(),
            self.model.graph2.as_path(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
train:
  optimizer: 'adam'
  adam: 0.001
data:
  type: 'MNIST'
  train: 'dataset/mnist'
  val: 'dataset/mnist'
  file_format: '*.png'
  batch_size: 64
  num_workers: 4
model:
  channel: 78
  classes: 10
  input_maxpool: true
  graph0: 'graphs/g0.txt'
  graph1: 'graphs/g1.txt'
  graph2: 'graphs/g2.txt'
log:
  chkpt_dir: 'chkpt'
"#;

    #[test]
    fn test_parses_training_config_with_extra_sections() {
        let hp = HParams::from_yaml_str(FULL).unwrap();
        assert_eq!(hp.data.kind, "MNIST");
        assert_eq!(hp.data.batch_size, 64);
        assert_eq!(hp.data.num_workers, 4);
        assert_eq!(hp.model.channel, 78);
        assert!(hp.model.input_maxpool);
        assert_eq!(hp.graph_paths()[2], Path::new("graphs/g2.txt"));
        assert_eq!(hp.dataset_kind().unwrap(), DatasetKind::Mnist);
    }

    #[test]
    fn test_defaults_apply() {
        let yaml = r#"
data: { type: CIFAR10, val: v }
model: { channel: 8, classes: 10, graph0: a, graph1: b, graph2: c }
"#;
        let hp = HParams::from_yaml_str(yaml).unwrap();
        assert_eq!(hp.data.batch_size, 128);
        assert_eq!(hp.data.num_workers, 1);
        assert!(!hp.model.input_maxpool);
    }

    #[test]
    fn test_zero_batch_size_is_an_error() {
        let yaml = FULL.replace("batch_size: 64", "batch_size: 0");
        let err = HParams::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_missing_model_section_is_an_error() {
        assert!(HParams::from_yaml_str("data: { type: MNIST, val: v }").is_err());
    }

    #[test]
    fn test_unsupported_type_parses_but_kind_fails() {
        let yaml = FULL.replace("'MNIST'", "'SVHN'");
        let hp = HParams::from_yaml_str(&yaml).unwrap();
        assert!(hp.dataset_kind().is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let err = HParams::load("does/not/exist.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.yaml"));
    }
}
