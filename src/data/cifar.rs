// ============================================================
// Layer 4 — CIFAR-10 Validation Set (binary batches)
// ============================================================
// The CIFAR-10 "binary version" test split is one file,
// `test_batch.bin`, made of fixed-size records:
//
//   label(u8) | red(1024 u8) | green(1024 u8) | blue(1024 u8)
//
// Each colour plane is 32×32 row-major, so a record is already
// in [C, H, W] order and only needs scaling + normalisation.

use anyhow::{bail, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::data::{dataset::{ImageDataset, ImageItem}, transform::normalize_planar};
use crate::domain::dataset_kind::DatasetKind;

const SIDE:        usize = 32;
const PLANE:       usize = SIDE * SIDE;
const RECORD_SIZE: usize = 1 + 3 * PLANE;

pub const TEST_BATCH: &str = "test_batch.bin";

/// Locate `test_batch.bin` directly in `dir` or in the
/// `cifar-10-batches-bin/` folder the archive unpacks to.
fn find_test_batch(dir: &Path) -> Result<PathBuf> {
    [dir.join(TEST_BATCH), dir.join("cifar-10-batches-bin").join(TEST_BATCH)]
        .into_iter()
        .find(|p| p.exists())
        .with_context(|| format!("CIFAR10 '{}' not found under '{}'", TEST_BATCH, dir.display()))
}

pub fn load_cifar10(dir: &Path) -> Result<ImageDataset> {
    let path  = find_test_batch(dir)?;
    let bytes = fs::read(&path).with_context(|| format!("Cannot read '{}'", path.display()))?;
    let dataset = from_records(&bytes)
        .with_context(|| format!("Invalid CIFAR10 batch '{}'", path.display()))?;
    tracing::info!("Loaded CIFAR10 test batch from '{}'", path.display());
    Ok(dataset)
}

pub fn from_records(bytes: &[u8]) -> Result<ImageDataset> {
    if bytes.len() % RECORD_SIZE != 0 {
        bail!("size {} is not a multiple of the {RECORD_SIZE}-byte record", bytes.len());
    }

    let norm = DatasetKind::Cifar10.normalization();
    let items = bytes
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            let pixels = normalize_planar(&record[1..], PLANE, &norm);
            ImageItem::new(pixels, [3, SIDE, SIDE], record[0] as usize)
        })
        .collect();
    Ok(ImageDataset::new(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::data::dataset::Dataset;

    fn record(label: u8, r: u8, g: u8, b: u8) -> Vec<u8> {
        let mut rec = vec![label];
        rec.extend(std::iter::repeat(r).take(PLANE));
        rec.extend(std::iter::repeat(g).take(PLANE));
        rec.extend(std::iter::repeat(b).take(PLANE));
        rec
    }

    #[test]
    fn test_records_decode_planar() {
        let mut bytes = record(2, 255, 0, 0);
        bytes.extend(record(8, 0, 0, 255));
        let ds = from_records(&bytes).unwrap();
        assert_eq!(ds.len(), 2);

        let item = ds.get(1).unwrap();
        assert_eq!(item.label, 8);
        assert_eq!(item.shape, [3, 32, 32]);
        // first pixel of the blue plane is 1.0 before normalisation
        let blue = item.pixels[2 * PLANE];
        assert!((blue - (1.0 - 0.4465) / 0.2010).abs() < 1e-5);
    }

    #[test]
    fn test_truncated_batch_rejected() {
        let mut bytes = record(1, 0, 0, 0);
        bytes.pop();
        assert!(from_records(&bytes).is_err());
    }

    #[test]
    fn test_finds_batch_in_archive_folder() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("cifar-10-batches-bin");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join(TEST_BATCH), record(5, 1, 2, 3)).unwrap();

        let ds = load_cifar10(dir.path()).unwrap();
        assert_eq!(ds.get(0).unwrap().label, 5);
    }

    #[test]
    fn test_missing_batch() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_cifar10(dir.path()).is_err());
    }
}
