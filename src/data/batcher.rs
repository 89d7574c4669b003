// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ImageItem>
// into device tensors.
//
// How batching works here:
//   Input:  Vec of N ImageItems, each with C×H×W pixels
//   Output: ImageBatch with images [N, C, H, W], targets [N]
//
//   All pixels are flattened sample by sample into one Vec,
//   then reshaped:
//   [s1_c1_p1, ..., s1_cC_pHW, s2_c1_p1, ..., sN_cC_pHW] → [N, C, H, W]
//
// Every item of one dataset has the same shape (the loaders
// resize/crop where needed), so no padding happens here.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ImageItem;

/// A batch of images ready for the forward pass.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Normalised pixels — shape: [batch_size, channels, height, width]
    pub images: Tensor<B, 4>,

    /// Ground truth class indices — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Holds the target device so tensors are created where the
/// model lives; this is the "move to device" step of the loop.
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ImageItem, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageItem>) -> ImageBatch<B> {
        let batch_size = items.len();
        let [channels, height, width] = items[0].shape;

        let pixels: Vec<f32> = items
            .iter()
            .flat_map(|item| item.pixels.iter().copied())
            .collect();

        // Burn uses i32 for Int tensor input
        let labels: Vec<i32> = items.iter().map(|item| item.label as i32).collect();

        let images = Tensor::<B, 1>::from_floats(pixels.as_slice(), &self.device)
            .reshape([batch_size, channels, height, width]);
        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        ImageBatch { images, targets }
    }
}

/// Batches of pre-grouped chunks: the loader hands over one chunk
/// at a time, so the chunk is the batch.
impl<B: Backend> Batcher<Vec<ImageItem>, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, chunks: Vec<Vec<ImageItem>>) -> ImageBatch<B> {
        let items: Vec<ImageItem> = chunks.into_iter().flatten().collect();
        <Self as Batcher<ImageItem, ImageBatch<B>>>::batch(self, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_order() {
        let items = vec![
            ImageItem::new(vec![0.0; 12], [3, 2, 2], 4),
            ImageItem::new(vec![1.0; 12], [3, 2, 2], 7),
        ];
        let batcher = ImageBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 3, 2, 2]);
        let targets: Vec<i64> = batch.targets.into_data().convert::<i64>().to_vec().unwrap();
        assert_eq!(targets, vec![4, 7]);

        // Second sample occupies the second half of the buffer
        let second: f32 = batch.images.slice([1..2, 0..3, 0..2, 0..2]).sum().into_scalar().elem();
        assert_eq!(second, 12.0);
    }
}
