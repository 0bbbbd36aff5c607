//! sRGB to CIE Lab conversion used by the colorization pipeline.

mod lab;

pub use lab::{lab_to_rgb, rgb_to_lab, rgb_to_lab_lightness, L_MAX};
