//! Conversion between model-sized RGB images and the model's NHWC tensors.
//!
//! Both tensors are walked in row-major order: element `[0, y, x, c]` belongs
//! to pixel `(x, y)`. The model has no coordinate input, so this layout is the
//! only thing tying a prediction back to its pixel.

use image::{Rgb, RgbImage};
use ndarray::Array4;

use crate::color::{lab_to_rgb, rgb_to_lab_lightness};
use crate::error::{Error, Result};
use crate::image::MODEL_IMAGE_SIZE;

/// Normalized L channel, shape `(1, 256, 256, 1)`, values in `[-1, 1]`.
pub type LightnessTensor = Array4<f32>;

/// Normalized interleaved ab channels, shape `(1, 256, 256, 2)`, values in `[-1, 1]`.
pub type ChromaTensor = Array4<f32>;

const SIZE: usize = MODEL_IMAGE_SIZE as usize;

/// Expected lightness tensor shape.
pub const LIGHTNESS_SHAPE: [usize; 4] = [1, SIZE, SIZE, 1];

/// Expected chrominance tensor shape.
pub const CHROMA_SHAPE: [usize; 4] = [1, SIZE, SIZE, 2];

/// Half the L range; maps `[0, 100]` onto `[-1, 1]`.
const L_SCALE: f32 = 50.0;

/// Scale of the a and b axes.
const AB_SCALE: f32 = 127.0;

/// Map L from `[0, 100]` to `[-1, 1]`.
#[inline]
#[must_use]
pub fn normalize_lightness(l: f32) -> f32 {
    l / L_SCALE - 1.0
}

/// Map a normalized lightness back to `[0, 100]`.
#[inline]
#[must_use]
pub fn denormalize_lightness(value: f32) -> f32 {
    (value + 1.0) * L_SCALE
}

/// Map a normalized a or b value back to Lab units.
#[inline]
#[must_use]
pub fn denormalize_chroma(value: f32) -> f32 {
    value * AB_SCALE
}

/// Build the lightness tensor for a model-sized image.
///
/// # Errors
///
/// Returns an error if the image is not `256x256`.
#[allow(clippy::cast_possible_truncation)]
pub fn lightness_tensor(img: &RgbImage) -> Result<LightnessTensor> {
    if img.dimensions() != (MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE) {
        return Err(Error::ShapeMismatch {
            expected: format!("{MODEL_IMAGE_SIZE}x{MODEL_IMAGE_SIZE} image"),
            actual: format!("{}x{} image", img.width(), img.height()),
        });
    }

    let mut tensor = Array4::<f32>::zeros(LIGHTNESS_SHAPE);

    for y in 0..SIZE {
        for x in 0..SIZE {
            // Safe: x and y are bounded by MODEL_IMAGE_SIZE (256) which fits in u32
            let Rgb([r, g, b]) = *img.get_pixel(x as u32, y as u32);
            tensor[[0, y, x, 0]] = normalize_lightness(rgb_to_lab_lightness(r, g, b));
        }
    }

    Ok(tensor)
}

/// Rebuild an RGB image from the input lightness and the predicted chrominance.
///
/// # Errors
///
/// Returns an error if either tensor has an unexpected shape.
#[allow(clippy::cast_possible_truncation)]
pub fn reconstruct(lightness: &LightnessTensor, chroma: &ChromaTensor) -> Result<RgbImage> {
    check_shape(lightness, LIGHTNESS_SHAPE, "lightness")?;
    check_shape(chroma, CHROMA_SHAPE, "chrominance")?;

    let mut img = RgbImage::new(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE);

    for y in 0..SIZE {
        for x in 0..SIZE {
            let l = denormalize_lightness(lightness[[0, y, x, 0]]);
            let a = denormalize_chroma(chroma[[0, y, x, 0]]);
            let b = denormalize_chroma(chroma[[0, y, x, 1]]);

            // Safe: x and y are bounded by MODEL_IMAGE_SIZE (256) which fits in u32
            img.put_pixel(x as u32, y as u32, Rgb(lab_to_rgb(l, a, b)));
        }
    }

    Ok(img)
}

/// Fail unless `tensor` has exactly `expected` as its shape.
fn check_shape(tensor: &Array4<f32>, expected: [usize; 4], what: &str) -> Result<()> {
    if tensor.shape() == expected {
        return Ok(());
    }

    Err(Error::ShapeMismatch {
        expected: format!("{what} {expected:?}"),
        actual: format!("{:?}", tensor.shape()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_round_trip() {
        for step in 0..=1000 {
            let l = step as f32 / 10.0;
            let back = denormalize_lightness(normalize_lightness(l));
            assert!((back - l).abs() < 1e-4, "L {l} came back as {back}");
        }
    }

    #[test]
    fn test_normalization_range() {
        assert_eq!(normalize_lightness(0.0), -1.0);
        assert_eq!(normalize_lightness(50.0), 0.0);
        assert_eq!(normalize_lightness(100.0), 1.0);
        assert_eq!(denormalize_chroma(1.0), 127.0);
        assert_eq!(denormalize_chroma(-1.0), -127.0);
    }

    #[test]
    fn test_lightness_tensor_shape_and_range() {
        let img = RgbImage::from_fn(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE, |x, y| {
            Rgb([x as u8, y as u8, (x ^ y) as u8])
        });
        let tensor = lightness_tensor(&img).unwrap();

        assert_eq!(tensor.shape(), &LIGHTNESS_SHAPE);
        assert!(tensor.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_lightness_tensor_extremes() {
        let black = RgbImage::new(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE);
        let tensor = lightness_tensor(&black).unwrap();
        assert!(tensor.iter().all(|v| (v + 1.0).abs() < 1e-3));

        let white = RgbImage::from_pixel(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE, Rgb([255; 3]));
        let tensor = lightness_tensor(&white).unwrap();
        assert!(tensor.iter().all(|v| (v - 1.0).abs() < 1e-3));
    }

    #[test]
    fn test_lightness_tensor_is_row_major() {
        // Brightness grows along x only, so a transposed walk would show up
        // as variation along the y axis of the tensor.
        let img = RgbImage::from_fn(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE, |x, _| {
            Rgb([x as u8, x as u8, x as u8])
        });
        let tensor = lightness_tensor(&img).unwrap();

        assert!(tensor[[0, 0, 255, 0]] > tensor[[0, 0, 0, 0]]);
        assert_eq!(tensor[[0, 0, 7, 0]], tensor[[0, 200, 7, 0]]);
        assert!(tensor[[0, 0, 8, 0]] > tensor[[0, 0, 7, 0]]);
    }

    #[test]
    fn test_lightness_tensor_rejects_wrong_size() {
        let img = RgbImage::new(100, 50);
        let err = lightness_tensor(&img).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_reconstruct_zero_chroma_is_gray() {
        let img = RgbImage::from_fn(MODEL_IMAGE_SIZE, MODEL_IMAGE_SIZE, |x, y| {
            let v = ((x + y) / 2) as u8;
            Rgb([v, v, v])
        });
        let lightness = lightness_tensor(&img).unwrap();
        let chroma = ChromaTensor::zeros(CHROMA_SHAPE);

        let out = reconstruct(&lightness, &chroma).unwrap();

        for (input, output) in img.pixels().zip(out.pixels()) {
            let Rgb([r, g, b]) = *output;
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1);
            assert!(r.abs_diff(input[0]) <= 1);
        }
    }

    #[test]
    fn test_reconstruct_reads_interleaved_channels() {
        let lightness = LightnessTensor::zeros(LIGHTNESS_SHAPE);
        let mut chroma = ChromaTensor::zeros(CHROMA_SHAPE);
        // Pixel (3, 1): strong positive a (red). Pixel (4, 1): strong negative b (blue).
        chroma[[0, 1, 3, 0]] = 0.5;
        chroma[[0, 1, 4, 1]] = -0.5;

        let out = reconstruct(&lightness, &chroma).unwrap();

        let red = out.get_pixel(3, 1);
        assert!(red[0] > red[1] && red[0] > red[2]);
        let blue = out.get_pixel(4, 1);
        assert!(blue[2] > blue[0] && blue[2] > blue[1]);
        let gray = out.get_pixel(1, 3);
        assert!(gray[0].abs_diff(gray[1]) <= 1 && gray[1].abs_diff(gray[2]) <= 1);
    }

    #[test]
    fn test_reconstruct_rejects_wrong_chroma_shape() {
        let lightness = LightnessTensor::zeros(LIGHTNESS_SHAPE);
        let chroma = ChromaTensor::zeros((1, SIZE, SIZE, 3));

        let err = reconstruct(&lightness, &chroma).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
