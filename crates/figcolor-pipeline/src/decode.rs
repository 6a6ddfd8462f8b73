//! Getting pixels into the pipeline.
//!
//! The pipeline itself works on an in-memory [`RgbImage`]. These helpers
//! build one either from encoded bytes (PNG, JPEG, BMP, WebP) or from a
//! raw interleaved RGB buffer, failing fast instead of handing an
//! undefined buffer downstream.

use crate::types::{PipelineError, RgbImage};

/// Decode raw image bytes into an 8-bit RGB buffer.
///
/// Alpha, if present, is dropped.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded image"]
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Wrap an interleaved `R, G, B` byte buffer as an image.
///
/// # Errors
///
/// Returns [`PipelineError::DimensionMismatch`] unless `pixels` holds
/// exactly `width * height * 3` bytes.
#[must_use = "returns the wrapped image"]
pub fn rgb_from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbImage, PipelineError> {
    let expected = u64::from(width) * u64::from(height) * 3;
    let actual = pixels.len();
    let mismatch = PipelineError::DimensionMismatch {
        width,
        height,
        expected,
        actual,
    };
    if u64::try_from(actual).ok() != Some(expected) {
        return Err(mismatch);
    }
    RgbImage::from_raw(width, height, pixels).ok_or(mismatch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGBA image as a PNG byte buffer.
    fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_rgb(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgb(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes_and_drops_alpha() {
        let img = image::RgbaImage::from_fn(17, 31, |_, _| image::Rgba([128, 64, 32, 200]));
        let rgb = decode_rgb(&encode_png(&img)).unwrap();
        assert_eq!(rgb.dimensions(), (17, 31));
        assert!(rgb.pixels().all(|p| p.0 == [128, 64, 32]));
    }

    #[test]
    fn raw_buffer_with_matching_length_is_wrapped() {
        let img = rgb_from_raw(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(img.get_pixel(1, 0).0, [4, 5, 6]);
    }

    #[test]
    fn raw_buffer_too_short_is_rejected() {
        let result = rgb_from_raw(2, 2, vec![0; 11]);
        assert!(matches!(
            result,
            Err(PipelineError::DimensionMismatch {
                expected: 12,
                actual: 11,
                ..
            })
        ));
    }

    #[test]
    fn raw_buffer_too_long_is_rejected_not_truncated() {
        let result = rgb_from_raw(2, 2, vec![0; 13]);
        assert!(matches!(
            result,
            Err(PipelineError::DimensionMismatch { actual: 13, .. })
        ));
    }
}
