// ============================================================
// Layer 4 — Validation Set Dispatch
// ============================================================
// Picks the loader for the configured DatasetKind and wraps the
// result in Burn's DataLoader:
//
//   MNIST    → IDX files          (in memory)
//   CIFAR10  → binary test batch  (in memory)
//   ImageNet → image folder       (decoded per item)
//
// The loader never shuffles. Batches are cut contiguously before
// the workers see them (see BatchChunks), so every worker count
// yields the same batches; with several workers only the order in
// which whole batches arrive may vary.

use anyhow::{bail, Result};
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    prelude::*,
};
use std::{path::Path, sync::Arc};

use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    cifar::load_cifar10,
    dataset::{BatchChunks, ImageDataset, ImageItem},
    image_folder::ImageFolderDataset,
    mnist::load_mnist,
};
use crate::domain::dataset_kind::DatasetKind;

/// One of the supported validation sets.
pub enum ValidationSet {
    InMemory(ImageDataset),
    Folder(ImageFolderDataset),
}

impl Dataset<ImageItem> for ValidationSet {
    fn get(&self, index: usize) -> Option<ImageItem> {
        match self {
            ValidationSet::InMemory(ds) => ds.get(index),
            ValidationSet::Folder(ds)   => ds.get(index),
        }
    }

    fn len(&self) -> usize {
        match self {
            ValidationSet::InMemory(ds) => ds.len(),
            ValidationSet::Folder(ds)   => ds.len(),
        }
    }
}

/// Load the validation split of `kind` from `root`.
pub fn load_validation_set(kind: DatasetKind, root: &Path) -> Result<ValidationSet> {
    tracing::debug!("Loading {} validation set from '{}'", kind, root.display());
    Ok(match kind {
        DatasetKind::Mnist    => ValidationSet::InMemory(load_mnist(root)?),
        DatasetKind::Cifar10  => ValidationSet::InMemory(load_cifar10(root)?),
        DatasetKind::ImageNet => ValidationSet::Folder(ImageFolderDataset::new(root)?),
    })
}

/// Batched, device-placing loader over a validation set.
pub fn build_val_loader<B: Backend>(
    set:         ValidationSet,
    batch_size:  usize,
    num_workers: usize,
    device:      B::Device,
) -> Result<Arc<dyn DataLoader<ImageBatch<B>>>> {
    if batch_size == 0 {
        bail!("batch_size must be positive");
    }
    let batcher = ImageBatcher::<B>::new(device);
    // One loader item is one whole batch
    let builder: DataLoaderBuilder<Vec<ImageItem>, ImageBatch<B>> =
        DataLoaderBuilder::new(batcher).batch_size(1);
    // 0 workers: batch on the calling thread
    let builder = if num_workers > 0 { builder.num_workers(num_workers) } else { builder };
    Ok(builder.build(BatchChunks::new(set, batch_size)))
}
