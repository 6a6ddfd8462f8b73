//! Shared types for the figcolor pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::ShapeLabel;
use crate::contour::ContourRetrieval;

/// Re-export `GrayImage` so downstream crates can reference the
/// grayscale and mask rasters without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage`, the pixel buffer the pipeline reads and writes.
pub use image::RgbImage;

/// Re-export `Rgb` for fill and palette colors.
pub use image::Rgb;

/// A pixel position in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column (pixels from left edge).
    pub x: i32,
    /// Row (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Whether a border encloses foreground or a background hole inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderKind {
    /// Outer border of a connected foreground region.
    Outer,
    /// Border of a background hole inside a foreground region.
    Hole,
}

/// Closed boundary of one connected region in a binary mask.
///
/// Points run in a consistent winding order and are run-length
/// compressed: only the pixels where the boundary changes direction are
/// kept. The last point connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour {
    /// Boundary pixels where the step direction changes.
    pub points: Vec<Point>,
    /// Outer border or hole border.
    pub kind: BorderKind,
    /// Index of the enclosing contour in the same contour list, if any.
    pub parent: Option<usize>,
}

impl Contour {
    /// Number of retained boundary points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the contour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closed-loop perimeter in pixels.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        crate::simplify::perimeter(&self.points)
    }
}

/// Closed polygon produced by simplifying a [`Contour`].
///
/// The vertex count is the only feature used for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a polygon from its vertices.
    #[must_use]
    pub const fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    /// Number of vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    /// Where the shape name is written: the bottom-left corner of the
    /// label text.
    ///
    /// Starts from the truncated mean of the vertices, then moves the
    /// x coordinate two thirds of the way towards the leftmost vertex,
    /// `x = (x_mean + 2 * x_min) / 3`, so the text stays inside the
    /// figure body. Returns `None` for an empty polygon.
    #[must_use]
    pub fn label_anchor(&self) -> Option<Point> {
        let min_x = self.0.iter().map(|p| p.x).min()?;
        let count = i64::try_from(self.0.len()).ok()?;
        let (sum_x, sum_y) = self.0.iter().fold((0_i64, 0_i64), |(sx, sy), p| {
            (sx + i64::from(p.x), sy + i64::from(p.y))
        });
        let mean_x = sum_x / count;
        let mean_y = sum_y / count;
        let x = (mean_x + 2 * i64::from(min_x)).div_euclid(3);
        Some(Point::new(
            i32::try_from(x).ok()?,
            i32::try_from(mean_y).ok()?,
        ))
    }

    /// Consumes the polygon and returns its vertices.
    #[must_use]
    pub fn into_vertices(self) -> Vec<Point> {
        self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// How figures are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColoringMode {
    /// Every contour gets its own color from evenly spaced hues,
    /// assigned by contour index.
    #[default]
    Unique,
    /// Every figure of the same [`ShapeLabel`] shares that label's color.
    ByShape,
}

/// Configuration for one coloring pass.
///
/// Integer parameters are kept signed so out-of-range input (e.g. a
/// negative threshold from the command line) reaches
/// [`validate`](Self::validate) and is rejected there instead of being
/// silently wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorizeConfig {
    /// Unique per-contour colors or per-shape colors.
    pub coloring: ColoringMode,

    /// Grayscale threshold: pixels brighter than this are foreground.
    /// Valid range is `0..=255`.
    pub threshold: i32,

    /// Divisor applied to each contour's perimeter to get the polygon
    /// approximation tolerance. Larger values keep more vertices. Must
    /// be positive.
    pub approximation_accuracy: i32,

    /// Which borders the contour extractor returns.
    pub retrieval: ContourRetrieval,
}

impl ColorizeConfig {
    /// Default grayscale threshold.
    pub const DEFAULT_THRESHOLD: i32 = 100;

    /// Default perimeter divisor for polygon approximation.
    pub const DEFAULT_APPROXIMATION_ACCURACY: i32 = 150;

    /// Thresholds below this value usually merge figures into the
    /// background.
    pub const THRESHOLD_WARN_LOW: i32 = 10;

    /// Thresholds above this value usually drop bright figures.
    pub const THRESHOLD_WARN_HIGH: i32 = 245;

    /// Accuracies below this value tend to collapse circles into
    /// polygons with too few vertices.
    pub const ACCURACY_WARN_LOW: i32 = 90;

    /// Accuracies above this value tend to keep too many vertices on
    /// triangles.
    pub const ACCURACY_WARN_HIGH: i32 = 800;

    /// Check that the parameters can be used at all.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if `threshold` is
    /// outside `0..=255` or `approximation_accuracy` is not positive.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.threshold_u8()?;
        if self.approximation_accuracy < 1 {
            return Err(PipelineError::InvalidParameter {
                name: "approximation accuracy",
                value: i64::from(self.approximation_accuracy),
                reason: "must be at least 1",
            });
        }
        Ok(())
    }

    /// Usable but risky parameter values.
    ///
    /// Warnings are informational; the pass runs regardless.
    #[must_use]
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.threshold < Self::THRESHOLD_WARN_LOW {
            warnings.push(ConfigWarning::ThresholdTooLow(self.threshold));
        }
        if self.threshold > Self::THRESHOLD_WARN_HIGH {
            warnings.push(ConfigWarning::ThresholdTooHigh(self.threshold));
        }
        if self.approximation_accuracy < Self::ACCURACY_WARN_LOW {
            warnings.push(ConfigWarning::AccuracyTooLow(self.approximation_accuracy));
        }
        if self.approximation_accuracy > Self::ACCURACY_WARN_HIGH {
            warnings.push(ConfigWarning::AccuracyTooHigh(self.approximation_accuracy));
        }
        warnings
    }

    /// The threshold as a pixel value.
    pub(crate) fn threshold_u8(&self) -> Result<u8, PipelineError> {
        u8::try_from(self.threshold).map_err(|_| PipelineError::InvalidParameter {
            name: "grayscale threshold",
            value: i64::from(self.threshold),
            reason: if self.threshold < 0 {
                "smaller than the minimum 8-bit value 0"
            } else {
                "bigger than the maximum 8-bit value 255"
            },
        })
    }
}

impl Default for ColorizeConfig {
    fn default() -> Self {
        Self {
            coloring: ColoringMode::default(),
            threshold: Self::DEFAULT_THRESHOLD,
            approximation_accuracy: Self::DEFAULT_APPROXIMATION_ACCURACY,
            retrieval: ContourRetrieval::default(),
        }
    }
}

/// A parameter value that is accepted but likely to give poor results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Threshold below [`ColorizeConfig::THRESHOLD_WARN_LOW`].
    ThresholdTooLow(i32),
    /// Threshold above [`ColorizeConfig::THRESHOLD_WARN_HIGH`].
    ThresholdTooHigh(i32),
    /// Accuracy below [`ColorizeConfig::ACCURACY_WARN_LOW`].
    AccuracyTooLow(i32),
    /// Accuracy above [`ColorizeConfig::ACCURACY_WARN_HIGH`].
    AccuracyTooHigh(i32),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ThresholdTooLow(t) => write!(
                f,
                "the grayscale threshold {t} is too small; try values between {} and {}",
                ColorizeConfig::THRESHOLD_WARN_LOW,
                ColorizeConfig::THRESHOLD_WARN_HIGH,
            ),
            Self::ThresholdTooHigh(t) => write!(
                f,
                "the grayscale threshold {t} is too big; try values between {} and {}",
                ColorizeConfig::THRESHOLD_WARN_LOW,
                ColorizeConfig::THRESHOLD_WARN_HIGH,
            ),
            Self::AccuracyTooLow(a) => write!(
                f,
                "the polygon approximation accuracy {a} is too low; values smaller than {} may result in circle detection failure",
                ColorizeConfig::ACCURACY_WARN_LOW,
            ),
            Self::AccuracyTooHigh(a) => write!(
                f,
                "the polygon approximation accuracy {a} is too high; values greater than {} may result in triangle detection failure",
                ColorizeConfig::ACCURACY_WARN_HIGH,
            ),
        }
    }
}

/// What the compositor decided for one contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Figure {
    /// Vertex count of the simplified polygon.
    pub vertex_count: usize,
    /// Shape class derived from `vertex_count`.
    pub label: ShapeLabel,
    /// Bottom-left corner of the label text.
    pub anchor: Point,
    /// Fill color actually used.
    pub color: Rgb<u8>,
}

/// Result of one pass with every intermediate preserved.
///
/// `contours`, `polygons` and `figures` are index-aligned.
#[derive(Debug, Clone)]
pub struct StagedResult {
    /// The input image, untouched.
    pub original: RgbImage,
    /// Luminance of the input.
    pub grayscale: GrayImage,
    /// Thresholded foreground mask (0 or 255).
    pub mask: GrayImage,
    /// Traced borders, in discovery order.
    pub contours: Vec<Contour>,
    /// Simplified polygon per contour.
    pub polygons: Vec<Polygon>,
    /// Classification and coloring per contour.
    pub figures: Vec<Figure>,
    /// Outlined, filled and labelled image.
    pub output: RgbImage,
    /// Image dimensions in pixels.
    pub dimensions: Dimensions,
}

impl StagedResult {
    /// Number of figures with the given label.
    #[must_use]
    pub fn count_label(&self, label: ShapeLabel) -> usize {
        self.figures.iter().filter(|f| f.label == label).count()
    }
}

/// Errors that can occur during a coloring pass.
///
/// Every error is raised before the output buffer is touched; there is
/// no partial result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A configuration value is outside its usable range.
    #[error("invalid {name} {value}: {reason}")]
    InvalidParameter {
        /// Human-readable parameter name.
        name: &'static str,
        /// The rejected value.
        value: i64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A raw pixel buffer does not match its declared dimensions.
    #[error("pixel buffer holds {actual} bytes but a {width}x{height} RGB image needs {expected}")]
    DimensionMismatch {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Bytes required by the dimensions.
        expected: u64,
        /// Bytes supplied.
        actual: usize,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_distance_to_self_is_zero() {
        let p = Point::new(7, 11);
        assert!(p.distance(p).abs() < f64::EPSILON);
    }

    // --- Contour tests ---

    #[test]
    fn contour_perimeter_closes_the_loop() {
        let contour = Contour {
            points: vec![
                Point::new(0, 0),
                Point::new(0, 3),
                Point::new(4, 3),
                Point::new(4, 0),
            ],
            kind: BorderKind::Outer,
            parent: None,
        };
        assert_eq!(contour.len(), 4);
        assert!((contour.perimeter() - 14.0).abs() < 1e-10);
    }

    // --- Polygon tests ---

    #[test]
    fn label_anchor_of_empty_polygon_is_none() {
        assert_eq!(Polygon::new(vec![]).label_anchor(), None);
    }

    #[test]
    fn label_anchor_shifts_towards_leftmost_vertex() {
        // Mean is (150, 183) after truncation; min x is 50.
        let triangle = Polygon::new(vec![
            Point::new(150, 50),
            Point::new(50, 250),
            Point::new(250, 250),
        ]);
        assert_eq!(triangle.label_anchor(), Some(Point::new(83, 183)));
    }

    #[test]
    fn label_anchor_of_single_vertex_is_that_vertex() {
        let dot = Polygon::new(vec![Point::new(12, 34)]);
        assert_eq!(dot.label_anchor(), Some(Point::new(12, 34)));
    }

    #[test]
    fn polygon_accessors() {
        let vertices = vec![Point::new(0, 0), Point::new(5, 0), Point::new(0, 5)];
        let polygon = Polygon::new(vertices.clone());
        assert_eq!(polygon.vertex_count(), 3);
        assert!(!polygon.is_empty());
        assert_eq!(polygon.vertices(), vertices.as_slice());
        assert_eq!(polygon.into_vertices(), vertices);
    }

    // --- ColorizeConfig tests ---

    #[test]
    fn config_defaults() {
        let config = ColorizeConfig::default();
        assert_eq!(config.coloring, ColoringMode::Unique);
        assert_eq!(config.threshold, 100);
        assert_eq!(config.approximation_accuracy, 150);
        assert_eq!(config.retrieval, ContourRetrieval::Tree);
        assert!(config.validate().is_ok());
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = ColorizeConfig {
            threshold: -5,
            ..ColorizeConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidParameter { value: -5, .. }
        ));
        assert!(err.to_string().contains("grayscale threshold"));
    }

    #[test]
    fn threshold_above_255_is_rejected() {
        let config = ColorizeConfig {
            threshold: 256,
            ..ColorizeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidParameter { value: 256, .. })
        ));
    }

    #[test]
    fn threshold_bounds_are_accepted() {
        for threshold in [0, 255] {
            let config = ColorizeConfig {
                threshold,
                ..ColorizeConfig::default()
            };
            assert!(config.validate().is_ok(), "threshold {threshold}");
        }
    }

    #[test]
    fn non_positive_accuracy_is_rejected() {
        for approximation_accuracy in [0, -1] {
            let config = ColorizeConfig {
                approximation_accuracy,
                ..ColorizeConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(PipelineError::InvalidParameter {
                    name: "approximation accuracy",
                    ..
                })
            ));
        }
    }

    #[test]
    fn risky_values_produce_warnings() {
        let low = ColorizeConfig {
            threshold: 5,
            approximation_accuracy: 50,
            ..ColorizeConfig::default()
        };
        assert_eq!(
            low.warnings(),
            vec![
                ConfigWarning::ThresholdTooLow(5),
                ConfigWarning::AccuracyTooLow(50),
            ]
        );

        let high = ColorizeConfig {
            threshold: 250,
            approximation_accuracy: 900,
            ..ColorizeConfig::default()
        };
        assert_eq!(
            high.warnings(),
            vec![
                ConfigWarning::ThresholdTooHigh(250),
                ConfigWarning::AccuracyTooHigh(900),
            ]
        );
    }

    #[test]
    fn warning_boundaries_are_inclusive() {
        let config = ColorizeConfig {
            threshold: 10,
            approximation_accuracy: 800,
            ..ColorizeConfig::default()
        };
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn warning_messages_mention_the_value() {
        let msg = ConfigWarning::AccuracyTooHigh(900).to_string();
        assert!(msg.contains("900"));
        assert!(msg.contains("triangle"));
    }

    #[test]
    fn config_json_round_trip_with_partial_input() {
        let config: ColorizeConfig =
            serde_json::from_str(r#"{"coloring":"ByShape","threshold":42}"#).unwrap();
        assert_eq!(config.coloring, ColoringMode::ByShape);
        assert_eq!(config.threshold, 42);
        assert_eq!(config.approximation_accuracy, 150);
    }
}
