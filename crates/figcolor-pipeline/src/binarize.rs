//! Grayscale conversion and thresholding.
//!
//! Turns the color buffer into a foreground mask: 255 where luminance is
//! strictly above the threshold, 0 elsewhere. Purely pixel-wise, there is
//! no blur or denoising, so noisy inputs produce noisy masks.

use image::Luma;
use imageproc::contrast::{self, ThresholdType};

use crate::types::{GrayImage, RgbImage};

/// BT.601 luma weights in 14-bit fixed point (they sum to `1 << 14`).
const WEIGHT_R: u32 = 4899;
const WEIGHT_G: u32 = 9617;
const WEIGHT_B: u32 = 1868;
const WEIGHT_SHIFT: u32 = 14;
const _: () = assert!(WEIGHT_R + WEIGHT_G + WEIGHT_B == 1 << WEIGHT_SHIFT);

/// Mask value for foreground pixels.
pub const FOREGROUND: u8 = 255;

/// Mask value for background pixels.
pub const BACKGROUND: u8 = 0;

/// Convert an RGB image to single-channel luminance.
///
/// Uses `0.299*R + 0.587*G + 0.114*B`, rounded to the nearest integer.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        Luma([luminance(r, g, b)])
    })
}

/// Threshold a grayscale image into a {0, 255} mask.
///
/// A pixel equal to `threshold` is background.
#[must_use = "returns the binary mask"]
pub fn threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    contrast::threshold(gray, threshold, ThresholdType::Binary)
}

/// Count foreground pixels in a mask.
#[must_use]
pub fn count_foreground(mask: &GrayImage) -> u64 {
    mask.pixels()
        .map(|p| u64::from(u8::from(p.0[0] == FOREGROUND)))
        .sum()
}

fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted =
        u32::from(r) * WEIGHT_R + u32::from(g) * WEIGHT_G + u32::from(b) * WEIGHT_B;
    let rounded = (weighted + (1 << (WEIGHT_SHIFT - 1))) >> WEIGHT_SHIFT;
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn white_and_black_are_extremes() {
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(0, 0, 0), 0);
    }

    #[test]
    fn weighted_channels() {
        // Green carries the most weight, blue the least.
        assert_eq!(luminance(255, 0, 0), 76);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 29);
    }

    #[test]
    fn gray_is_preserved() {
        for v in [1, 50, 100, 128, 200, 254] {
            assert_eq!(luminance(v, v, v), v);
        }
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = RgbImage::from_pixel(17, 31, Rgb([10, 20, 30]));
        let gray = to_grayscale(&img);
        assert_eq!(gray.dimensions(), (17, 31));
        let mask = threshold(&gray, 100);
        assert_eq!(mask.dimensions(), (17, 31));
    }

    #[test]
    fn threshold_is_strictly_greater() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([99 + u8::try_from(x).unwrap_or(0)]));
        let mask = threshold(&gray, 100);
        assert_eq!(mask.get_pixel(0, 0).0[0], BACKGROUND); // 99
        assert_eq!(mask.get_pixel(1, 0).0[0], BACKGROUND); // 100
        assert_eq!(mask.get_pixel(2, 0).0[0], FOREGROUND); // 101
    }

    #[test]
    fn threshold_255_masks_everything_out() {
        let gray = GrayImage::from_pixel(4, 4, Luma([255]));
        assert_eq!(count_foreground(&threshold(&gray, 255)), 0);
    }

    #[test]
    fn threshold_0_keeps_everything_but_black() {
        let gray = GrayImage::from_fn(4, 1, |x, _| Luma([u8::try_from(x).unwrap_or(0)]));
        assert_eq!(count_foreground(&threshold(&gray, 0)), 3);
    }
}
