// ============================================================
// Layer 3 — Dataset Kind
// ============================================================
// The validation set is chosen by the `data.type` string in the
// configuration. Only three keys are supported; anything else
// is a configuration error and must be reported before any
// graph, model or checkpoint work starts.
//
// Each kind also knows the per-channel normalisation that the
// network was trained with and the shape of one input image.

use anyhow::{bail, Error, Result};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    Mnist,
    Cifar10,
    ImageNet,
}

/// Per-channel mean/std applied after scaling pixels to [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub mean: Vec<f32>,
    pub std:  Vec<f32>,
}

impl Normalization {
    /// Normalise one pixel value already scaled to [0, 1].
    pub fn apply(&self, channel: usize, value: f32) -> f32 {
        (value - self.mean[channel]) / self.std[channel]
    }
}

impl DatasetKind {
    pub const SUPPORTED: [&'static str; 3] = ["MNIST", "CIFAR10", "ImageNet"];

    pub fn key(&self) -> &'static str {
        match self {
            DatasetKind::Mnist    => "MNIST",
            DatasetKind::Cifar10  => "CIFAR10",
            DatasetKind::ImageNet => "ImageNet",
        }
    }

    /// Number of input channels the first convolution expects.
    pub fn channels(&self) -> usize {
        match self {
            DatasetKind::Mnist => 1,
            DatasetKind::Cifar10 | DatasetKind::ImageNet => 3,
        }
    }

    /// Spatial size (height, width) of one network input.
    pub fn image_size(&self) -> (usize, usize) {
        match self {
            DatasetKind::Mnist    => (28, 28),
            DatasetKind::Cifar10  => (32, 32),
            DatasetKind::ImageNet => (224, 224),
        }
    }

    pub fn normalization(&self) -> Normalization {
        match self {
            DatasetKind::Mnist => Normalization {
                mean: vec![0.1307],
                std:  vec![0.3081],
            },
            DatasetKind::Cifar10 => Normalization {
                mean: vec![0.4914, 0.4822, 0.4465],
                std:  vec![0.2023, 0.1994, 0.2010],
            },
            DatasetKind::ImageNet => Normalization {
                mean: vec![0.485, 0.456, 0.406],
                std:  vec![0.229, 0.224, 0.225],
            },
        }
    }
}

impl FromStr for DatasetKind {
    type Err = Error;

    // Keys are matched exactly, as written in the config files.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MNIST"    => Ok(DatasetKind::Mnist),
            "CIFAR10"  => Ok(DatasetKind::Cifar10),
            "ImageNet" => Ok(DatasetKind::ImageNet),
            other => bail!(
                "Dataset type '{}' currently not supported (expected one of {:?})",
                other,
                Self::SUPPORTED
            ),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_keys_round_trip() {
        for key in DatasetKind::SUPPORTED {
            let kind: DatasetKind = key.parse().unwrap();
            assert_eq!(kind.key(), key);
        }
    }

    #[test]
    fn test_unknown_and_miscased_keys_rejected() {
        assert!("SVHN".parse::<DatasetKind>().is_err());
        assert!("mnist".parse::<DatasetKind>().is_err());
        assert!("".parse::<DatasetKind>().is_err());
    }

    #[test]
    fn test_normalization_matches_channels() {
        for kind in [DatasetKind::Mnist, DatasetKind::Cifar10, DatasetKind::ImageNet] {
            let norm = kind.normalization();
            assert_eq!(norm.mean.len(), kind.channels());
            assert_eq!(norm.std.len(),  kind.channels());
        }
        let norm = DatasetKind::Mnist.normalization();
        assert!((norm.apply(0, 0.1307)).abs() < 1e-6);
    }
}
