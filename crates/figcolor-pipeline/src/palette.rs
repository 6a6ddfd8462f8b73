//! Evenly spaced fill colors for unique-color mode.
//!
//! Hues are spread over the color wheel at fixed saturation and value,
//! so the palette only depends on how many colors are requested. The
//! HSV to sRGB conversion itself is done by the `palette` crate.

use ::palette::{FromColor, Hsv, Srgb, encoding};

use crate::types::Rgb;

/// HSV saturation of every generated color.
pub const SATURATION: f64 = 1.0;

/// HSV value (brightness) of every generated color.
pub const VALUE: f64 = 0.6;

/// Generate `n` distinct colors with hues `360 * i / n` degrees for
/// `i in 0..n`.
///
/// Channels are scaled to `0..=255` and truncated. `n == 0` yields an
/// empty palette.
#[must_use = "returns the generated palette"]
#[allow(clippy::cast_precision_loss)]
pub fn gen_colors(n: usize) -> Vec<Rgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 360.0 * i as f64 / n as f64;
            let (r, g, b) = hsv_to_rgb(hue, SATURATION, VALUE);
            Rgb([to_channel(r), to_channel(g), to_channel(b)])
        })
        .collect()
}

/// Convert HSV (hue in degrees, saturation and value in `[0, 1]`) to
/// sRGB components in `[0, 1]`.
#[must_use]
pub fn hsv_to_rgb(hue: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let hsv = Hsv::<encoding::Srgb, f64>::new(hue, s, v);
    Srgb::<f64>::from_color(hsv).into_components()
}

/// Scale a `[0, 1]` channel to `0..=255`, truncating.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(c: f64) -> u8 {
    (c * 255.0).clamp(0.0, 255.0) as u8
}
