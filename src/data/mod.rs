// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from files on disk to device-ready batches.
//
//   files under data.val
//       │
//       ▼
//   mnist / cifar / image_folder   → parse + decode
//       │
//       ▼
//   transform                      → resize/crop, normalise
//       │
//       ▼
//   ImageItem datasets             → Burn's Dataset trait
//       │
//       ▼
//   ImageBatcher                   → stacks items into tensors
//       │
//       ▼
//   DataLoader (loader.rs)         → feeds the validation loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// ImageItem and the in-memory dataset
pub mod dataset;

/// Implements Burn's Batcher trait for image batches
pub mod batcher;

/// Normalisation and ImageNet resize / centre crop
pub mod transform;

/// MNIST IDX reader
pub mod mnist;

/// CIFAR-10 binary batch reader
pub mod cifar;

/// Directory-per-class image dataset (ImageNet)
pub mod image_folder;

/// DatasetKind dispatch and DataLoader construction
pub mod loader;
