//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pass in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use figcolor_pipeline::{ColorizeConfig, Pipeline, PipelineError, RgbImage};
//! # fn run(image: RgbImage) -> Result<(), PipelineError> {
//! let config = ColorizeConfig::default();
//! let pipeline = Pipeline::new(image, config)
//!     .binarize()?
//!     .trace_contours()
//!     .simplify()
//!     .composite();
//!
//! let staged = pipeline.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for the one fallible stage), carrying all previously
//! computed intermediates. The caller can inspect the current stage's
//! output via accessor methods at any point.

use crate::classify::ShapeLabel;
use crate::contour::ContourTracer;
use crate::diagnostics::{StageMetrics, contour_stats, total_points};
use crate::types::{
    BorderKind, ColorizeConfig, Contour, Dimensions, Figure, GrayImage, PipelineError, Polygon,
    RgbImage, StagedResult,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// The source image and config are stored but not yet touched.
/// Call [`binarize`](Self::binarize) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .binarize() to continue"]
pub struct Pending {
    config: ColorizeConfig,
    original: RgbImage,
}

impl Pending {
    /// The source image.
    #[must_use]
    pub const fn original(&self) -> &RgbImage {
        &self.original
    }

    /// Validate the config, convert to grayscale and threshold.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if the config fails
    /// [`ColorizeConfig::validate`]. No pixel is processed in that case.
    pub fn binarize(self) -> Result<Binarized, PipelineError> {
        self.config.validate()?;
        let threshold = self.config.threshold_u8()?;
        let grayscale = crate::binarize::to_grayscale(&self.original);
        let mask = crate::binarize::threshold(&grayscale, threshold);
        Ok(Binarized {
            config: self.config,
            original: self.original,
            grayscale,
            mask,
            threshold,
        })
    }
}

// ───────────────────────── Stage 1: Binarized ────────────────────────

/// Pipeline state after grayscale conversion and thresholding.
///
/// Call [`trace_contours`](Self::trace_contours) to advance to the next
/// stage.
#[must_use = "pipeline stages are consumed by advancing; call .trace_contours() to continue"]
pub struct Binarized {
    config: ColorizeConfig,
    original: RgbImage,
    grayscale: GrayImage,
    mask: GrayImage,
    threshold: u8,
}

impl Binarized {
    /// Counts and sizes describing the work done to reach this stage.
    #[must_use]
    pub fn measure(&self) -> StageMetrics {
        StageMetrics::Binarize {
            threshold: self.threshold,
            foreground_pixel_count: crate::binarize::count_foreground(&self.mask),
            total_pixel_count: u64::from(self.mask.width()) * u64::from(self.mask.height()),
        }
    }

    /// Luminance of the source image.
    #[must_use]
    pub const fn grayscale(&self) -> &GrayImage {
        &self.grayscale
    }

    /// Foreground mask: 255 above the threshold, 0 elsewhere.
    #[must_use]
    pub const fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Advance to the contour tracing stage.
    ///
    /// An empty mask yields an empty contour list; that is not an error.
    pub fn trace_contours(self) -> ContoursTraced {
        let contours = self.config.retrieval.trace(&self.mask);
        ContoursTraced {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            mask: self.mask,
            contours,
        }
    }
}

// ───────────────────────── Stage 2: ContoursTraced ───────────────────

/// Pipeline state after contour tracing.
///
/// Call [`simplify`](Self::simplify) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .simplify() to continue"]
pub struct ContoursTraced {
    config: ColorizeConfig,
    original: RgbImage,
    grayscale: GrayImage,
    mask: GrayImage,
    contours: Vec<Contour>,
}

impl ContoursTraced {
    /// Counts and sizes describing the work done to reach this stage.
    #[must_use]
    pub fn measure(&self) -> StageMetrics {
        let stats = contour_stats(&self.contours);
        let hole_count = self
            .contours
            .iter()
            .filter(|c| c.kind == BorderKind::Hole)
            .count();
        StageMetrics::ContourTracing {
            retrieval: format!("{:?}", self.config.retrieval),
            contour_count: self.contours.len(),
            hole_count,
            total_point_count: stats.total,
            min_contour_points: stats.min,
            max_contour_points: stats.max,
            mean_contour_points: stats.mean,
        }
    }

    /// The traced borders, in discovery order.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Advance to the polygon simplification stage.
    pub fn simplify(self) -> Simplified {
        let polygons = crate::simplify::simplify_contours(
            &self.contours,
            f64::from(self.config.approximation_accuracy),
        );
        Simplified {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            mask: self.mask,
            contours: self.contours,
            polygons,
        }
    }
}

// ───────────────────────── Stage 3: Simplified ───────────────────────

/// Pipeline state after polygon approximation.
///
/// `polygons` is index-aligned with the contours. Call
/// [`composite`](Self::composite) to advance to the final stage.
#[must_use = "pipeline stages are consumed by advancing; call .composite() to continue"]
pub struct Simplified {
    config: ColorizeConfig,
    original: RgbImage,
    grayscale: GrayImage,
    mask: GrayImage,
    contours: Vec<Contour>,
    polygons: Vec<Polygon>,
}

impl Simplified {
    /// Counts and sizes describing the work done to reach this stage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn measure(&self) -> StageMetrics {
        let points_before = total_points(&self.contours);
        let points_after: usize = self.polygons.iter().map(Polygon::vertex_count).sum();
        let reduction_ratio = if points_before > 0 {
            1.0 - (points_after as f64 / points_before as f64)
        } else {
            0.0
        };
        StageMetrics::Simplification {
            approximation_accuracy: self.config.approximation_accuracy,
            polygon_count: self.polygons.len(),
            points_before,
            points_after,
            reduction_ratio,
        }
    }

    /// One approximating polygon per contour.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Advance to the compositing stage.
    pub fn composite(self) -> Composited {
        let (output, figures) = crate::draw::composite(
            &self.original,
            &self.contours,
            &self.polygons,
            self.config.coloring,
        );
        let dimensions = Dimensions {
            width: self.original.width(),
            height: self.original.height(),
        };
        Composited {
            config: self.config,
            original: self.original,
            grayscale: self.grayscale,
            mask: self.mask,
            contours: self.contours,
            polygons: self.polygons,
            figures,
            output,
            dimensions,
        }
    }
}

// ───────────────────────── Stage 4: Composited ───────────────────────

/// Pipeline state after every figure has been outlined, filled and
/// labelled. This is the final stage.
///
/// Call [`into_result`](Self::into_result) to collect all intermediates
/// into a [`StagedResult`].
#[must_use = "call .into_result() to obtain the StagedResult"]
pub struct Composited {
    config: ColorizeConfig,
    original: RgbImage,
    grayscale: GrayImage,
    mask: GrayImage,
    contours: Vec<Contour>,
    polygons: Vec<Polygon>,
    figures: Vec<Figure>,
    output: RgbImage,
    dimensions: Dimensions,
}

impl Composited {
    /// Counts and sizes describing the work done to reach this stage.
    #[must_use]
    pub fn measure(&self) -> StageMetrics {
        let count = |label| self.figures.iter().filter(|f| f.label == label).count();
        StageMetrics::Composite {
            coloring: format!("{:?}", self.config.coloring),
            figure_count: self.figures.len(),
            triangles: count(ShapeLabel::Triangle),
            squares: count(ShapeLabel::Square),
            circles: count(ShapeLabel::Circle),
            unexpected: count(ShapeLabel::Unexpected),
        }
    }

    /// The composited image.
    #[must_use]
    pub const fn output(&self) -> &RgbImage {
        &self.output
    }

    /// Per-contour classification and fill color.
    #[must_use]
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Image dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Consume the pipeline and return all intermediates.
    pub fn into_result(self) -> StagedResult {
        StagedResult {
            original: self.original,
            grayscale: self.grayscale,
            mask: self.mask,
            contours: self.contours,
            polygons: self.polygons,
            figures: self.figures,
            output: self.output,
            dimensions: self.dimensions,
        }
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental coloring pipeline.
///
/// Created via [`Pipeline::new`], which stores the source image and
/// config without doing any processing. Each stage method consumes the
/// current state and returns the next, making it a compile-time error
/// to skip stages or call them out of order.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from a source image and config.
    ///
    /// No processing is performed and the config is not validated yet;
    /// [`binarize`](Pending::binarize) does that before touching any
    /// pixel.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(image: RgbImage, config: ColorizeConfig) -> Pending {
        Pending {
            config,
            original: image,
        }
    }
}
