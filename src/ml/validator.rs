// ============================================================
// Layer 5 — Validation Loop
// ============================================================
// Runs the model over the whole validation loader and reduces
// the results to two numbers: average loss and accuracy.
//
// Key points:
//   - The model lives on an inference backend (no Autodiff), so
//     no gradients are tracked and BatchNorm uses running stats
//   - The batcher already placed every batch on the device
//   - argmax(1) returns [batch, 1] so we flatten before .equal()
//
// Loss reduction (kept exactly as the reference tool reports it):
//   loss_sum  = Σ over batches of mean_nll(batch)
//   avg_loss  = loss_sum / dataset_len
// This is NOT the per-sample mean when batches differ in size,
// and it shrinks as the batch size grows. Reported numbers must
// stay comparable with earlier runs, so it is not corrected here.

use anyhow::{bail, Result};
use burn::prelude::*;

use crate::data::batcher::ImageBatch;

/// Anything that maps an image batch to per-class log-probabilities.
pub trait Classifier<B: Backend> {
    /// images: [batch, channels, height, width] → [batch, classes]
    fn log_probs(&self, images: Tensor<B, 4>) -> Tensor<B, 2>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub avg_loss: f64,
    pub accuracy: f64,
    pub correct:  usize,
    pub total:    usize,
}

/// Mean negative log-likelihood of `targets` under `log_probs`.
pub fn nll_loss<B: Backend>(log_probs: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
    let [batch_size, _] = log_probs.dims();
    log_probs
        .gather(1, targets.reshape([batch_size, 1]))
        .mean()
        .neg()
}

/// Evaluate `model` on every batch and aggregate.
///
/// `dataset_len` is the number of samples in the underlying
/// dataset; both loss and accuracy are normalised by it.
pub fn validate<B, M, I>(model: &M, batches: I, dataset_len: usize) -> Result<ValidationResult>
where
    B: Backend,
    M: Classifier<B>,
    I: IntoIterator<Item = ImageBatch<B>>,
{
    if dataset_len == 0 {
        bail!("Validation set is empty");
    }

    let mut loss_sum = 0.0f64;
    let mut correct  = 0usize;
    let mut seen     = 0usize;

    for batch in batches {
        seen += batch.targets.dims()[0];

        let output = model.log_probs(batch.images);

        loss_sum += nll_loss(output.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();

        let pred = output.argmax(1).flatten::<1>(0, 1);
        let batch_correct: i64 = pred
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        correct += batch_correct as usize;
    }

    // The loader stops early when an item cannot be produced.
    if seen != dataset_len {
        bail!("Validation covered {seen} of {dataset_len} samples");
    }

    Ok(ValidationResult {
        avg_loss: loss_sum / dataset_len as f64,
        accuracy: correct as f64 / dataset_len as f64,
        correct,
        total: dataset_len,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    const CLASSES: usize = 10;
    const HIT: f32 = 0.9;

    /// Predicts the class encoded as the single pixel value of each
    /// image, with probability HIT; the rest is spread evenly.
    struct EchoClassifier;

    fn hit_nll()  -> f64 { -(HIT as f64).ln() }
    fn miss_nll() -> f64 { -((1.0 - HIT as f64) / (CLASSES - 1) as f64).ln() }

    impl<B: Backend> Classifier<B> for EchoClassifier {
        fn log_probs(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
            let device = images.device();
            let preds: Vec<f32> = images.into_data().convert::<f32>().to_vec().unwrap();
            let hit  = HIT.ln();
            let miss = ((1.0 - HIT) / (CLASSES - 1) as f32).ln();

            let flat: Vec<f32> = preds
                .iter()
                .flat_map(|&p| (0..CLASSES).map(move |c| if c == p as usize { hit } else { miss }))
                .collect();
            Tensor::<B, 1>::from_floats(flat.as_slice(), &device).reshape([preds.len(), CLASSES])
        }
    }

    fn batch(preds: &[i32], targets: &[i32]) -> ImageBatch<TestBackend> {
        let device = Default::default();
        let pixels: Vec<f32> = preds.iter().map(|&p| p as f32).collect();
        ImageBatch {
            images:  Tensor::<TestBackend, 1>::from_floats(pixels.as_slice(), &device)
                .reshape([preds.len(), 1, 1, 1]),
            targets: Tensor::<TestBackend, 1, Int>::from_ints(targets, &device),
        }
    }

    #[test]
    fn test_all_correct_gives_accuracy_one() {
        let batches = vec![batch(&[1, 2, 3], &[1, 2, 3]), batch(&[4, 5], &[4, 5])];
        let r = validate(&EchoClassifier, batches, 5).unwrap();
        assert_eq!(r.accuracy, 1.0);
        assert_eq!(r.correct, 5);
    }

    #[test]
    fn test_all_wrong_gives_accuracy_zero() {
        let batches = vec![batch(&[0, 0], &[1, 2]), batch(&[9], &[8])];
        let r = validate(&EchoClassifier, batches, 3).unwrap();
        assert_eq!(r.accuracy, 0.0);
        assert!(r.avg_loss >= 0.0);
    }

    #[test]
    fn test_uneven_batches_sum_of_means_quirk() {
        // 2 batches of sizes 3 and 1; 2 correct in the first, 1 in the second
        let batches = vec![batch(&[0, 1, 7], &[0, 1, 2]), batch(&[3], &[3])];
        let r = validate(&EchoClassifier, batches, 4).unwrap();

        assert_eq!(r.correct, 3);
        assert!((r.accuracy - 0.75).abs() < 1e-12);

        let batch1_mean = (2.0 * hit_nll() + miss_nll()) / 3.0;
        let batch2_mean = hit_nll();
        let expected    = (batch1_mean + batch2_mean) / 4.0;
        assert!((r.avg_loss - expected).abs() < 1e-5, "{} vs {}", r.avg_loss, expected);

        // ...which differs from the true per-sample mean
        let per_sample = (3.0 * hit_nll() + miss_nll()) / 4.0;
        assert!((r.avg_loss - per_sample).abs() > 1e-2);
    }

    #[test]
    fn test_results_are_bounded() {
        let batches = vec![batch(&[0, 3, 3, 9], &[0, 3, 4, 1])];
        let r = validate(&EchoClassifier, batches, 4).unwrap();
        assert!(r.avg_loss >= 0.0);
        assert!((0.0..=1.0).contains(&r.accuracy));
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let batches: Vec<ImageBatch<TestBackend>> = Vec::new();
        assert!(validate(&EchoClassifier, batches, 0).is_err());
    }

    #[test]
    fn test_short_loader_is_an_error() {
        let batches = vec![batch(&[1], &[1])];
        let err = validate(&EchoClassifier, batches, 4).unwrap_err();
        assert!(err.to_string().contains("1 of 4"));
    }

    #[test]
    fn test_nll_loss_picks_target_column() {
        let device = Default::default();
        let log_probs = Tensor::<TestBackend, 1>::from_floats([-0.5, -2.0, -1.0, -3.0], &device)
            .reshape([2, 2]);
        let targets = Tensor::<TestBackend, 1, Int>::from_ints([1, 0], &device);
        let loss: f32 = nll_loss(log_probs, targets).into_scalar().elem();
        assert!((loss - 1.5).abs() < 1e-6);
    }
}
