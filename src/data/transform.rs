// ============================================================
// Layer 4 — Image Transforms
// ============================================================
// The evaluation-time transforms the networks were trained with:
//
//   MNIST / CIFAR10:  bytes → [0, 1] → (x - mean) / std
//   ImageNet:         resize shorter side to 256
//                     → centre crop 224×224
//                     → [0, 1] → (x - mean) / std
//
// Decoding and resampling are delegated to the `image` crate.

use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::domain::dataset_kind::Normalization;

/// Normalise planar (channel-major) u8 pixels.
/// `raw.len()` must be `channels * plane`.
pub fn normalize_planar(raw: &[u8], plane: usize, norm: &Normalization) -> Vec<f32> {
    raw.iter()
        .enumerate()
        .map(|(i, &v)| norm.apply(i / plane, v as f32 / 255.0))
        .collect()
}

/// Resize so the shorter side equals `shorter`, keeping aspect ratio,
/// then cut the centred `crop`×`crop` square.
pub fn resize_center_crop(img: &DynamicImage, shorter: u32, crop: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let (new_w, new_h) = if w <= h {
        (shorter, ((h as u64 * shorter as u64) / w as u64) as u32)
    } else {
        (((w as u64 * shorter as u64) / h as u64) as u32, shorter)
    };
    let resized = img.resize_exact(new_w, new_h, FilterType::Triangle);

    let left = ((new_w.saturating_sub(crop)) as f32 / 2.0).round() as u32;
    let top  = ((new_h.saturating_sub(crop)) as f32 / 2.0).round() as u32;
    resized.crop_imm(left, top, crop, crop)
}

/// Interleaved RGB → planar [3, H, W], normalised.
pub fn rgb_to_chw(img: &DynamicImage, norm: &Normalization) -> (Vec<f32>, [usize; 3]) {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let plane = (w * h) as usize;

    let mut data = vec![0.0f32; 3 * plane];
    for (i, px) in rgb.pixels().enumerate() {
        for c in 0..3 {
            data[c * plane + i] = norm.apply(c, px[c] as f32 / 255.0);
        }
    }
    (data, [3, h as usize, w as usize])
}
