// ============================================================
// Layer 4 — MNIST Validation Set (IDX files)
// ============================================================
// The MNIST test split is two files under `data.val`:
//   - t10k-images-idx3-ubyte  (10,000 28×28 images)
//   - t10k-labels-idx1-ubyte  (10,000 labels 0-9)
//
// IDX format (all values big-endian):
//   images: magic(2051) | count(u32) | rows(u32) | cols(u32) | pixels(u8...)
//   labels: magic(2049) | count(u32) | labels(u8...)
//
// `.gz` compressed copies are decompressed on the fly with flate2.
// Nothing is downloaded; the files must already be on disk.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::{fs, io::Read, path::Path};

use crate::data::{dataset::{ImageDataset, ImageItem}, transform::normalize_planar};
use crate::domain::dataset_kind::DatasetKind;

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

pub const TEST_IMAGES: &str = "t10k-images-idx3-ubyte";
pub const TEST_LABELS: &str = "t10k-labels-idx1-ubyte";

/// Load the MNIST test split from `dir`.
pub fn load_mnist(dir: &Path) -> Result<ImageDataset> {
    let images = read_maybe_gz(dir, TEST_IMAGES)?;
    let labels = read_maybe_gz(dir, TEST_LABELS)?;
    let dataset = from_idx_bytes(&images, &labels)
        .with_context(|| format!("Invalid MNIST files in '{}'", dir.display()))?;
    tracing::info!("Loaded MNIST test split from '{}'", dir.display());
    Ok(dataset)
}

pub fn from_idx_bytes(image_bytes: &[u8], label_bytes: &[u8]) -> Result<ImageDataset> {
    let (images, rows, cols) = parse_idx3_images(image_bytes)?;
    let labels = parse_idx1_labels(label_bytes)?;

    if images.len() != labels.len() {
        bail!("{} images vs {} labels", images.len(), labels.len());
    }

    let norm  = DatasetKind::Mnist.normalization();
    let plane = rows * cols;
    let items = images
        .iter()
        .zip(labels)
        .map(|(img, label)| {
            ImageItem::new(normalize_planar(img, plane, &norm), [1, rows, cols], label as usize)
        })
        .collect();
    Ok(ImageDataset::new(items))
}

fn read_maybe_gz(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let plain = dir.join(name);
    if plain.exists() {
        return fs::read(&plain).with_context(|| format!("Cannot read '{}'", plain.display()));
    }

    let gz = dir.join(format!("{name}.gz"));
    if gz.exists() {
        let file = fs::File::open(&gz).with_context(|| format!("Cannot open '{}'", gz.display()))?;
        let mut out = Vec::new();
        GzDecoder::new(file)
            .read_to_end(&mut out)
            .with_context(|| format!("Cannot decompress '{}'", gz.display()))?;
        return Ok(out);
    }

    bail!("MNIST file not found: '{}' (or .gz)", plain.display())
}

fn read_u32_be(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .context("IDX header is truncated")?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn parse_idx3_images(data: &[u8]) -> Result<(Vec<Vec<u8>>, usize, usize)> {
    let magic = read_u32_be(data, 0)?;
    if magic != IMAGES_MAGIC {
        bail!("bad image magic: expected {IMAGES_MAGIC}, got {magic}");
    }
    let count = read_u32_be(data, 4)? as usize;
    let rows  = read_u32_be(data, 8)? as usize;
    let cols  = read_u32_be(data, 12)? as usize;

    let size = rows.checked_mul(cols).context("IDX header sizes overflow")?;
    if size == 0 {
        bail!("image size is {rows}x{cols}");
    }
    let needed = count.checked_mul(size).context("IDX header sizes overflow")?;
    let body = &data[16..];
    if body.len() < needed {
        bail!("image data truncated: need {} bytes, have {}", needed, body.len());
    }

    let images = body.chunks_exact(size).take(count).map(<[u8]>::to_vec).collect();
    Ok((images, rows, cols))
}

fn parse_idx1_labels(data: &[u8]) -> Result<Vec<u8>> {
    let magic = read_u32_be(data, 0)?;
    if magic != LABELS_MAGIC {
        bail!("bad label magic: expected {LABELS_MAGIC}, got {magic}");
    }
    let count = read_u32_be(data, 4)? as usize;
    let body  = &data[8..];
    if body.len() < count {
        bail!("label data truncated: need {} bytes, have {}", count, body.len());
    }
    Ok(body[..count].to_vec())
}

/// Encode images/labels as IDX files; used to build fixtures.
#[cfg(test)]
pub(crate) fn write_idx_fixture(dir: &Path, images: &[Vec<u8>], labels: &[u8]) {
    let mut img = Vec::new();
    img.extend(IMAGES_MAGIC.to_be_bytes());
    img.extend((images.len() as u32).to_be_bytes());
    img.extend(28u32.to_be_bytes());
    img.extend(28u32.to_be_bytes());
    for pixels in images {
        img.extend(pixels);
    }

    let mut lbl = Vec::new();
    lbl.extend(LABELS_MAGIC.to_be_bytes());
    lbl.extend((labels.len() as u32).to_be_bytes());
    lbl.extend(labels);

    fs::write(dir.join(TEST_IMAGES), img).unwrap();
    fs::write(dir.join(TEST_LABELS), lbl).unwrap();
}
