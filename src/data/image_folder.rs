// ============================================================
// Layer 4 — ImageNet Validation Set (image folder)
// ============================================================
// The ImageNet validation split is laid out one directory per
// class:
//
//   val/
//     n01440764/
//       ILSVRC2012_val_00000293.JPEG
//       ...
//     n01443537/
//       ...
//
// Class indices are the positions of the sorted directory names,
// which is how the training pipeline assigned them.
//
// 50,000 decoded 224×224 images do not fit comfortably in memory,
// so only the (path, class) list is held and each image is
// decoded when the data loader asks for it.

use anyhow::{bail, Context, Result};
use burn::data::dataset::Dataset;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::{dataset::ImageItem, transform::{resize_center_crop, rgb_to_chw}};
use crate::domain::dataset_kind::{DatasetKind, Normalization};

const EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

const RESIZE_SHORTER: u32 = 256;

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub struct ImageFolderDataset {
    entries:     Vec<(PathBuf, usize)>,
    class_names: Vec<String>,
    crop:        u32,
    norm:        Normalization,
}

impl ImageFolderDataset {
    /// Scan `root` for class directories and their images.
    pub fn new(root: &Path) -> Result<Self> {
        let mut class_dirs: Vec<PathBuf> = fs::read_dir(root)
            .with_context(|| format!("Cannot read image folder '{}'", root.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        class_dirs.sort();

        let mut entries     = Vec::new();
        let mut class_names = Vec::with_capacity(class_dirs.len());

        for (class_idx, dir) in class_dirs.iter().enumerate() {
            let mut files: Vec<PathBuf> = fs::read_dir(dir)
                .with_context(|| format!("Cannot read class folder '{}'", dir.display()))?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_image(p))
                .collect();
            files.sort();

            entries.extend(files.into_iter().map(|p| (p, class_idx)));
            class_names.push(
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }

        if entries.is_empty() {
            bail!("No images found under '{}'", root.display());
        }

        let (crop, _) = DatasetKind::ImageNet.image_size();
        tracing::info!(
            "Indexed {} images in {} classes under '{}'",
            entries.len(),
            class_names.len(),
            root.display()
        );

        Ok(Self {
            entries,
            class_names,
            crop: crop as u32,
            norm: DatasetKind::ImageNet.normalization(),
        })
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn load_item(&self, index: usize) -> Result<ImageItem> {
        let (path, label) = &self.entries[index];
        let img = image::open(path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?;
        let img = resize_center_crop(&img, RESIZE_SHORTER, self.crop);
        let (pixels, shape) = rgb_to_chw(&img, &self.norm);
        Ok(ImageItem::new(pixels, shape, *label))
    }
}

impl Dataset<ImageItem> for ImageFolderDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        if index >= self.entries.len() {
            return None;
        }
        // A None here ends the loader early; the validation loop
        // then reports the shortfall as an error.
        match self.load_item(index) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::error!("{e:#}");
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
