//! figcolor-pipeline: shape detection and coloring (sans-IO).
//!
//! Finds simple figures in a raster image and paints over them:
//! grayscale -> threshold -> contour tracing -> polygon approximation ->
//! classification by vertex count -> outline, fill and label.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and returns new ones. Reading files and showing results lives
//! in the `figcolor` binary.

pub mod binarize;
pub mod classify;
pub mod contour;
pub mod decode;
pub mod diagnostics;
pub mod draw;
pub mod font;
pub mod palette;
pub mod pipeline;
pub mod simplify;
pub mod types;

pub use classify::ShapeLabel;
pub use contour::{ContourRetrieval, ContourTracer};
pub use crate::palette::gen_colors;
pub use pipeline::Pipeline;
pub use types::{
    BorderKind, ColoringMode, ColorizeConfig, ConfigWarning, Contour, Dimensions, Figure,
    GrayImage, PipelineError, Point, Polygon, Rgb, RgbImage, StagedResult,
};

/// Detect, classify and color every figure in `image`.
///
/// Returns a new image of the same dimensions; `image` itself is never
/// modified. An image without foreground comes back unchanged.
///
/// # Pipeline steps
///
/// 1. Validate `config`
/// 2. Grayscale conversion and thresholding
/// 3. Contour tracing (outer and hole borders, raster order)
/// 4. Polygon approximation with a perimeter-relative tolerance
/// 5. Classification, then outline, fill and label per contour
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] if the threshold is
/// outside `0..=255` or the approximation accuracy is not positive.
pub fn color_image(image: &RgbImage, config: &ColorizeConfig) -> Result<RgbImage, PipelineError> {
    // 1. Validate before touching any pixel.
    config.validate()?;

    // 2. Grayscale + threshold.
    let gray = binarize::to_grayscale(image);
    let mask = binarize::threshold(&gray, config.threshold_u8()?);

    // 3. Contour tracing.
    let contours = config.retrieval.trace(&mask);

    // 4. Polygon approximation.
    let polygons =
        simplify::simplify_contours(&contours, f64::from(config.approximation_accuracy));

    // 5. Classify and draw.
    let (output, _figures) = draw::composite(image, &contours, &polygons, config.coloring);
    Ok(output)
}

/// Run the full pass and keep every intermediate.
///
/// Equivalent to driving a [`Pipeline`] through all of its stages.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] if `config` is invalid.
pub fn process_staged(
    image: &RgbImage,
    config: &ColorizeConfig,
) -> Result<StagedResult, PipelineError> {
    Ok(Pipeline::new(image.clone(), config.clone())
        .binarize()?
        .trace_contours()
        .simplify()
        .composite()
        .into_result())
}
