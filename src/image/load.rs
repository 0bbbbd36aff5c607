//! Image loading utilities.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, RgbImage};

use crate::error::{Error, Result};

use super::MODEL_IMAGE_SIZE;

/// Load an image from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn open<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();

    image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode an in-memory encoded image (PNG, JPEG, ...). The format is guessed
/// from the leading bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|source| Error::ImageDecode { source })
}

/// Resize an image of any size to the model resolution and drop any alpha.
///
/// The resize always runs, even when the source is already model-sized, and
/// uses a bilinear filter to match the distribution the model was trained on.
#[must_use]
pub fn resize_for_model(img: &DynamicImage) -> RgbImage {
    img.resize_exact(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8()
}
