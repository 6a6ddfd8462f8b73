//! Shape classification by polygon vertex count.
//!
//! Label text and class color are both derived from the single
//! [`ShapeLabel`] tag so the two can never disagree.

use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Smallest vertex count read as a circle.
///
/// A smooth closed curve simplified with a perimeter-relative tolerance
/// keeps a roughly constant, fairly large number of vertices; anything
/// from here up is treated as round.
pub const CIRCLE_MIN_VERTICES: usize = 10;

/// Shape class of a simplified contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeLabel {
    /// Exactly 3 vertices.
    Triangle,
    /// Exactly 4 vertices.
    Square,
    /// [`CIRCLE_MIN_VERTICES`] or more vertices.
    Circle,
    /// Anything else, including degenerate 1- and 2-vertex polygons.
    Unexpected,
}

impl ShapeLabel {
    /// All labels, in display order.
    pub const ALL: [Self; 4] = [Self::Triangle, Self::Square, Self::Circle, Self::Unexpected];

    /// Classify a polygon by its vertex count. Total over all inputs.
    #[must_use]
    pub const fn from_vertex_count(vertex_count: usize) -> Self {
        match vertex_count {
            3 => Self::Triangle,
            4 => Self::Square,
            n if n >= CIRCLE_MIN_VERTICES => Self::Circle,
            _ => Self::Unexpected,
        }
    }

    /// Text drawn on the figure.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Triangle => "TRIANGLE",
            Self::Square => "SQUARE",
            Self::Circle => "CIRCLE",
            Self::Unexpected => "UNEXPECTED FIGURE",
        }
    }

    /// Fill color used when coloring by shape.
    #[must_use]
    pub const fn color(self) -> Rgb<u8> {
        match self {
            Self::Triangle => Rgb([200, 0, 0]),
            Self::Square => Rgb([0, 200, 0]),
            Self::Circle => Rgb([0, 0, 200]),
            Self::Unexpected => Rgb([70, 70, 70]),
        }
    }
}

impl std::fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}
