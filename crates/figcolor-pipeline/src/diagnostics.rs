//! Pass diagnostics: timing, counts, and other metrics for each stage.
//!
//! The library never reads a clock on its own. Callers that want timings
//! pass a [`Clock`] to [`process_staged_with_diagnostics`]; everything
//! else about a run (counts, sizes, label tallies) is derived from the
//! stage outputs.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::ShapeLabel;
use crate::pipeline::Pipeline;
use crate::types::{ColorizeConfig, Contour, PipelineError, RgbImage, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
///
/// Native callers wrap `std::time::Instant`; tests can supply a fake
/// clock that advances deterministically.
pub trait Clock {
    /// Opaque point in time.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single coloring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: grayscale conversion and thresholding.
    pub binarize: StageDiagnostics,
    /// Stage 2: contour tracing.
    pub contour_tracing: StageDiagnostics,
    /// Stage 3: polygon approximation.
    pub simplification: StageDiagnostics,
    /// Stage 4: outlining, filling and labelling.
    pub composite: StageDiagnostics,
    /// Total wall-clock duration of the entire pass (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Grayscale conversion and threshold metrics.
    Binarize {
        /// Threshold applied to the luminance.
        threshold: u8,
        /// Number of foreground pixels (value == 255) in the mask.
        foreground_pixel_count: u64,
        /// Total pixel count for computing coverage.
        total_pixel_count: u64,
    },
    /// Contour tracing metrics.
    ContourTracing {
        /// Retrieval mode used.
        retrieval: String,
        /// Number of contours found.
        contour_count: usize,
        /// How many of them are hole borders.
        hole_count: usize,
        /// Total number of points across all contours.
        total_point_count: usize,
        /// Minimum points in any single contour.
        min_contour_points: usize,
        /// Maximum points in any single contour.
        max_contour_points: usize,
        /// Mean points per contour.
        mean_contour_points: f64,
    },
    /// Polygon approximation metrics.
    Simplification {
        /// Perimeter divisor used for the tolerance.
        approximation_accuracy: i32,
        /// Number of polygons produced.
        polygon_count: usize,
        /// Total contour points before simplification.
        points_before: usize,
        /// Total polygon vertices after simplification.
        points_after: usize,
        /// Reduction ratio: `1.0 - (after / before)`.
        reduction_ratio: f64,
    },
    /// Compositing metrics.
    Composite {
        /// Coloring mode used.
        coloring: String,
        /// Number of figures drawn.
        figure_count: usize,
        /// Figures labelled TRIANGLE.
        triangles: usize,
        /// Figures labelled SQUARE.
        squares: usize,
        /// Figures labelled CIRCLE.
        circles: usize,
        /// Figures labelled UNEXPECTED FIGURE.
        unexpected: usize,
    },
}

/// High-level summary counts for the entire pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Number of contours found.
    pub contour_count: usize,
    /// Figure count per label, in [`ShapeLabel::ALL`] order.
    pub label_counts: Vec<(ShapeLabel, usize)>,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        // Per-stage breakdown.
        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let stages = [
            ("Binarize", &self.binarize),
            ("Contour Tracing", &self.contour_tracing),
            ("Simplification", &self.simplification),
            ("Composite", &self.composite),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        let tally: Vec<String> = self
            .summary
            .label_counts
            .iter()
            .map(|(label, n)| format!("{label}: {n}"))
            .collect();
        lines.push(format!(
            "Contours: {}  |  {}",
            self.summary.contour_count,
            tally.join("  "),
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Binarize {
            threshold,
            foreground_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let coverage = if *total_pixel_count > 0 {
                *foreground_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("t={threshold} foreground={foreground_pixel_count} ({coverage:.1}%)")
        }
        StageMetrics::ContourTracing {
            retrieval,
            contour_count,
            hole_count,
            total_point_count,
            min_contour_points,
            max_contour_points,
            mean_contour_points,
        } => {
            format!(
                "{retrieval} {contour_count} contours ({hole_count} holes), {total_point_count} pts (min={min_contour_points} max={max_contour_points} mean={mean_contour_points:.1})",
            )
        }
        StageMetrics::Simplification {
            approximation_accuracy,
            points_before,
            points_after,
            reduction_ratio,
            ..
        } => {
            format!(
                "acc={approximation_accuracy} {points_before}->{points_after} pts ({:.1}% reduction)",
                reduction_ratio * 100.0,
            )
        }
        StageMetrics::Composite {
            coloring,
            figure_count,
            triangles,
            squares,
            circles,
            unexpected,
        } => {
            format!(
                "{coloring} {figure_count} figures (tri={triangles} sq={squares} circ={circles} other={unexpected})",
            )
        }
    }
}

/// Statistics for a set of contours.
pub(crate) struct ContourStats {
    /// Total number of points across all contours.
    pub total: usize,
    /// Minimum number of points in any single contour.
    pub min: usize,
    /// Maximum number of points in any single contour.
    pub max: usize,
    /// Mean number of points per contour.
    pub mean: f64,
}

/// Compute point statistics over a set of contours.
pub(crate) fn contour_stats(contours: &[Contour]) -> ContourStats {
    let total = total_points(contours);
    let min = contours.iter().map(Contour::len).min().unwrap_or(0);
    let max = contours.iter().map(Contour::len).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let mean = if contours.is_empty() {
        0.0
    } else {
        total as f64 / contours.len() as f64
    };
    ContourStats {
        total,
        min,
        max,
        mean,
    }
}

/// Total points across a slice of contours.
pub(crate) fn total_points(contours: &[Contour]) -> usize {
    contours.iter().map(Contour::len).sum()
}

/// Run the full pass, timing every stage with `clock`.
///
/// Produces exactly the same [`StagedResult`] as
/// [`process_staged`](crate::process_staged).
///
/// # Errors
///
/// Returns [`PipelineError::InvalidParameter`] if `config` is invalid.
pub fn process_staged_with_diagnostics<C: Clock>(
    image: &RgbImage,
    config: &ColorizeConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    let total_start = clock.now();

    let start = clock.now();
    let binarized = Pipeline::new(image.clone(), config.clone()).binarize()?;
    let binarize = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: binarized.measure(),
    };

    let start = clock.now();
    let traced = binarized.trace_contours();
    let contour_tracing = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: traced.measure(),
    };

    let start = clock.now();
    let simplified = traced.simplify();
    let simplification = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: simplified.measure(),
    };

    let start = clock.now();
    let composited = simplified.composite();
    let composite = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: composited.measure(),
    };

    let total_duration = clock.elapsed(&total_start);
    let staged = composited.into_result();

    let summary = PipelineSummary {
        image_width: staged.dimensions.width,
        image_height: staged.dimensions.height,
        pixel_count: u64::from(staged.dimensions.width) * u64::from(staged.dimensions.height),
        contour_count: staged.contours.len(),
        label_counts: ShapeLabel::ALL
            .iter()
            .map(|&label| (label, staged.count_label(label)))
            .collect(),
    };

    Ok((
        staged,
        PipelineDiagnostics {
            binarize,
            contour_tracing,
            simplification,
            composite,
            total_duration,
            summary,
        },
    ))
}
