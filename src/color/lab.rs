//! CIE Lab conversions under the D65 illuminant.
//!
//! The model was trained on Lab images produced by a gamma-correct
//! sRGB -> XYZ -> Lab conversion. A luma approximation such as
//! `0.299 R + 0.587 G + 0.114 B` gives a different lightness distribution
//! and is not a substitute.

use palette::{FromColor, IntoColor, Lab, Srgb};

/// Upper bound of the L channel.
pub const L_MAX: f32 = 100.0;

/// Convert an 8-bit sRGB triple to Lab (D65 reference white).
#[must_use]
pub fn rgb_to_lab(r: u8, g: u8, b: u8) -> Lab {
    let srgb = Srgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    );
    Lab::from_color(srgb)
}

/// Convert an 8-bit sRGB triple to Lab and return only the lightness, in `[0, 100]`.
#[must_use]
pub fn rgb_to_lab_lightness(r: u8, g: u8, b: u8) -> f32 {
    rgb_to_lab(r, g, b).l
}

/// Convert a Lab triple back to 8-bit sRGB.
///
/// Out-of-gamut colors are clamped per channel to `[0, 255]`. No alpha is
/// produced.
#[must_use]
pub fn lab_to_rgb(l: f32, a: f32, b: f32) -> [u8; 3] {
    let srgb: Srgb = Lab::new(l, a, b).into_color();
    [
        to_u8(srgb.red),
        to_u8(srgb.green),
        to_u8(srgb.blue),
    ]
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(channel: f32) -> u8 {
    // Safe: clamped to [0, 255] before casting
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_white_is_max_lightness() {
        let l = rgb_to_lab_lightness(255, 255, 255);
        assert!((l - L_MAX).abs() < 0.01, "white L = {l}");
    }

    #[test]
    fn test_black_is_min_lightness() {
        let l = rgb_to_lab_lightness(0, 0, 0);
        assert!(l.abs() < 0.01, "black L = {l}");
    }

    #[test]
    fn test_mid_gray_uses_gamma_correct_lightness() {
        // sRGB 119 is ~18% linear reflectance, which is L* ~50.
        let l = rgb_to_lab_lightness(119, 119, 119);
        assert!((l - 50.0).abs() < 0.5, "L = {l}");
    }

    #[test]
    fn test_lightness_is_monotonic_in_gray() {
        let mut previous = -1.0;
        for v in 0..=255u8 {
            let l = rgb_to_lab_lightness(v, v, v);
            assert!(l > previous, "L({v}) = {l} not above {previous}");
            previous = l;
        }
    }

    #[test]
    fn test_gray_round_trip() {
        for v in 0..=255u8 {
            let l = rgb_to_lab_lightness(v, v, v);
            let [r, g, b] = lab_to_rgb(l, 0.0, 0.0);
            for c in [r, g, b] {
                assert!(c.abs_diff(v) <= 1, "gray {v} came back as {r},{g},{b}");
            }
        }
    }

    #[test]
    fn test_color_round_trip() {
        for (r, g, b) in [(255, 0, 0), (0, 128, 0), (30, 60, 200), (250, 200, 10)] {
            let lab = rgb_to_lab(r, g, b);
            let out = lab_to_rgb(lab.l, lab.a, lab.b);
            assert!(out[0].abs_diff(r) <= 1);
            assert!(out[1].abs_diff(g) <= 1);
            assert!(out[2].abs_diff(b) <= 1);
        }
    }

    #[test]
    fn test_lab_to_rgb_clamps_out_of_gamut() {
        assert_eq!(lab_to_rgb(100.0, 0.0, 0.0), [255, 255, 255]);
        assert_eq!(lab_to_rgb(0.0, 0.0, 0.0), [0, 0, 0]);

        // Extreme chroma saturates channels instead of wrapping.
        let [_, g, b] = lab_to_rgb(50.0, 127.0, -127.0);
        assert_eq!(g, 0);
        assert_eq!(b, 255);
    }

    #[test]
    fn test_positive_a_is_reddish() {
        let [r, g, _] = lab_to_rgb(50.0, 60.0, 0.0);
        assert!(r > g);
    }
}
