// ============================================================
// Layer 4 — Image Datasets
// ============================================================
// ImageItem is the unit every loader produces: normalised pixels
// in [C, H, W] layout plus the class index.
//
//   ImageDataset   whole split decoded in memory (MNIST, CIFAR10)
//   BatchChunks    groups any item dataset into contiguous
//                  batches: chunk i holds items [i*n, (i+1)*n)
//
// Burn's multi-thread loader splits its dataset into one slice
// per worker, and each slice ends with its own short batch. Over
// BatchChunks the workers share out whole batches instead, so the
// batch boundaries do not depend on the worker count.
//
// Reference: Burn Book §4 (Dataset)

use burn::data::dataset::Dataset;

/// One normalised image in [C, H, W] layout plus its class.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub pixels: Vec<f32>,
    pub shape:  [usize; 3],
    pub label:  usize,
}

impl ImageItem {
    pub fn new(pixels: Vec<f32>, shape: [usize; 3], label: usize) -> Self {
        debug_assert_eq!(pixels.len(), shape.iter().product::<usize>());
        Self { pixels, shape, label }
    }
}

/// A dataset fully decoded into memory (MNIST, CIFAR10).
#[derive(Debug)]
pub struct ImageDataset {
    items: Vec<ImageItem>,
}

impl ImageDataset {
    pub fn new(items: Vec<ImageItem>) -> Self { Self { items } }
}

impl Dataset<ImageItem> for ImageDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Contiguous fixed-size chunks of an item dataset; only the last
/// chunk may be shorter.
pub struct BatchChunks<D> {
    inner:      D,
    chunk_size: usize,
}

impl<D: Dataset<ImageItem>> BatchChunks<D> {
    /// `chunk_size` must be positive.
    pub fn new(inner: D, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        Self { inner, chunk_size }
    }
}

impl<D: Dataset<ImageItem>> Dataset<Vec<ImageItem>> for BatchChunks<D> {
    /// None if the chunk is out of range or any of its items fails to load.
    fn get(&self, index: usize) -> Option<Vec<ImageItem>> {
        let start = index.checked_mul(self.chunk_size)?;
        if start >= self.inner.len() {
            return None;
        }
        let end = (start + self.chunk_size).min(self.inner.len());
        (start..end).map(|i| self.inner.get(i)).collect()
    }

    fn len(&self) -> usize {
        self.inner.len().div_ceil(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> ImageDataset {
        ImageDataset::new((0..n).map(|i| ImageItem::new(vec![0.0], [1, 1, 1], i)).collect())
    }

    #[test]
    fn test_chunks_are_contiguous_with_one_short_tail() {
        let chunks = BatchChunks::new(items(10), 4);
        assert_eq!(chunks.len(), 3);

        let labels: Vec<Vec<usize>> = (0..chunks.len())
            .map(|i| chunks.get(i).unwrap().iter().map(|it| it.label).collect())
            .collect();
        assert_eq!(labels, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
        assert!(chunks.get(3).is_none());
    }

    #[test]
    fn test_empty_dataset_has_no_chunks() {
        let chunks = BatchChunks::new(items(0), 4);
        assert_eq!(chunks.len(), 0);
        assert!(chunks.get(0).is_none());
    }
}
