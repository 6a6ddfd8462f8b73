//! Compositing: outline, fill and label every contour on a copy of the
//! source image.
//!
//! Outlines and label strokes are rasterized with `tiny-skia` (no
//! anti-aliasing, so the output only ever contains the input colors plus
//! the fill and stroke colors). Interiors are filled with
//! `imageproc::drawing::draw_polygon_mut`, boundary inclusive.
//!
//! Contours are drawn in order, so where two figures overlap the later
//! one wins.

use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::classify::ShapeLabel;
use crate::palette::gen_colors;
use crate::types::{ColoringMode, Contour, Figure, Point, Polygon, Rgb, RgbImage};

/// Width of the contour outline in pixels.
pub const OUTLINE_WIDTH: f32 = 4.0;

/// Outline stroke color.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Label text color.
pub const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Label size derived from the image height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    /// Font scale; 1.0 draws 21 px capitals.
    pub scale: f32,
    /// Stroke thickness in pixels, at least 1.
    pub thickness: u32,
}

impl LabelStyle {
    /// Image height per unit of font scale.
    pub const SCALE_DIVISOR: u32 = 700;

    /// Image height per pixel of stroke thickness.
    pub const THICKNESS_DIVISOR: u32 = 300;

    /// `scale = height / 700`, `thickness = max(height / 300, 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_height(height: u32) -> Self {
        Self {
            scale: height as f32 / Self::SCALE_DIVISOR as f32,
            thickness: (height / Self::THICKNESS_DIVISOR).max(1),
        }
    }
}

/// Fill color for figure `index` of a pass.
///
/// `palette` is only consulted in [`ColoringMode::Unique`].
fn fill_color(mode: ColoringMode, palette: &[Rgb<u8>], index: usize, label: ShapeLabel) -> Rgb<u8> {
    match mode {
        ColoringMode::Unique => palette.get(index).copied().unwrap_or_else(|| label.color()),
        ColoringMode::ByShape => label.color(),
    }
}

/// Classify, color and draw every contour onto a copy of `image`.
///
/// `contours` and `polygons` must be index-aligned. Returns the
/// composited image and one [`Figure`] per contour, in the same order.
#[must_use = "returns the composited image and per-contour figures"]
pub fn composite(
    image: &RgbImage,
    contours: &[Contour],
    polygons: &[Polygon],
    mode: ColoringMode,
) -> (RgbImage, Vec<Figure>) {
    let mut output = image.clone();
    let style = LabelStyle::for_height(image.height());
    let palette = match mode {
        ColoringMode::Unique => gen_colors(contours.len()),
        ColoringMode::ByShape => Vec::new(),
    };

    let figures = contours
        .iter()
        .zip(polygons)
        .enumerate()
        .map(|(i, (contour, polygon))| {
            let label = ShapeLabel::from_vertex_count(polygon.vertex_count());
            let anchor = polygon
                .label_anchor()
                .or_else(|| contour.points.first().copied())
                .unwrap_or_default();
            let figure = Figure {
                vertex_count: polygon.vertex_count(),
                label,
                anchor,
                color: fill_color(mode, &palette, i, label),
            };
            draw_figure(&mut output, contour, &figure, style);
            figure
        })
        .collect();

    (output, figures)
}

/// Outline, fill, then label one figure.
pub fn draw_figure(image: &mut RgbImage, contour: &Contour, figure: &Figure, style: LabelStyle) {
    let ring = [to_float(&contour.points)];
    stroke_polylines(image, &ring, true, OUTLINE_WIDTH, OUTLINE_COLOR);
    fill_contour(image, &contour.points, figure.color);
    draw_label(image, figure.label.text(), figure.anchor, style);
}

/// Draw `text` with its baseline starting at `anchor`.
#[allow(clippy::cast_precision_loss)]
pub fn draw_label(image: &mut RgbImage, text: &str, anchor: Point, style: LabelStyle) {
    let strokes = crate::font::layout(text, (anchor.x as f32, anchor.y as f32), style.scale);
    stroke_polylines(image, &strokes, false, style.thickness as f32, LABEL_COLOR);
}

/// Fill the closed region bounded by `points`, boundary included.
///
/// One point sets a single pixel, two points draw a line segment.
pub fn fill_contour(image: &mut RgbImage, points: &[Point], color: Rgb<u8>) {
    // The polygon filler rejects a repeated closing vertex.
    let mut end = points.len();
    while end > 1 && points[end - 1] == points[0] {
        end -= 1;
    }
    let points = &points[..end];

    match points {
        [] => {}
        [p] => {
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y))
                && x < image.width()
                && y < image.height()
            {
                image.put_pixel(x, y, color);
            }
        }
        #[allow(clippy::cast_precision_loss)]
        [a, b] => draw_line_segment_mut(
            image,
            (a.x as f32, a.y as f32),
            (b.x as f32, b.y as f32),
            color,
        ),
        _ => {
            let polygon: Vec<imageproc::point::Point<i32>> = points
                .iter()
                .map(|p| imageproc::point::Point::new(p.x, p.y))
                .collect();
            draw_polygon_mut(image, &polygon, color);
        }
    }
}

/// Stroke polylines of the given width onto `image` in a solid color.
///
/// Coordinates are pixel centers: the point `(x, y)` is the middle of
/// pixel `(x, y)`. A polyline whose points all coincide becomes a round
/// dot of the stroke width.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn stroke_polylines(
    image: &mut RgbImage,
    polylines: &[Vec<(f32, f32)>],
    closed: bool,
    width: f32,
    color: Rgb<u8>,
) {
    let mut pb = PathBuilder::new();
    let mut bounds: Option<(f32, f32, f32, f32)> = None;

    for polyline in polylines {
        let Some(&first) = polyline.first() else {
            continue;
        };
        if polyline.iter().all(|&p| p == first) {
            let radius = ((width / 2.0).round() as i32).max(0);
            draw_filled_circle_mut(image, (first.0 as i32, first.1 as i32), radius, color);
            continue;
        }

        pb.move_to(first.0 + 0.5, first.1 + 0.5);
        for &(x, y) in &polyline[1..] {
            pb.line_to(x + 0.5, y + 0.5);
        }
        if closed {
            pb.close();
        }

        for &(x, y) in polyline {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }

    let (Some(path), Some((min_x, min_y, max_x, max_y))) = (pb.finish(), bounds) else {
        return;
    };

    // Rasterize only the padded bounding box, clipped to the image.
    let pad = width.ceil() + 1.0;
    let x0 = (min_x - pad).floor().max(0.0) as u32;
    let y0 = (min_y - pad).floor().max(0.0) as u32;
    let x1 = ((max_x + pad).ceil().max(0.0) as u32).min(image.width());
    let y1 = ((max_y + pad).ceil().max(0.0) as u32).min(image.height());
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let Some(mut pixmap) = Pixmap::new(x1 - x0, y1 - y0) else {
        return;
    };

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0[0], color.0[1], color.0[2], 255);
    paint.anti_alias = false;

    pixmap.stroke_path(
        &path,
        &paint,
        &stroke,
        Transform::from_translate(-(x0 as f32), -(y0 as f32)),
        None,
    );

    let span = pixmap.width();
    for (i, pixel) in pixmap.data().chunks_exact(4).enumerate() {
        if pixel[3] < 128 {
            continue;
        }
        let Ok(i) = u32::try_from(i) else {
            break;
        };
        image.put_pixel(x0 + i % span, y0 + i / span, color);
    }
}

#[allow(clippy::cast_precision_loss)]
fn to_float(points: &[Point]) -> Vec<(f32, f32)> {
    points.iter().map(|p| (p.x as f32, p.y as f32)).collect()
}
