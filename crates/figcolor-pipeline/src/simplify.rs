//! Polygon approximation of closed contours (Ramer-Douglas-Peucker).
//!
//! The tolerance is relative to each contour's perimeter,
//! `epsilon = perimeter / approximation_accuracy`, so a figure drawn at
//! twice the size collapses to about the same number of vertices. That
//! matters because classification looks at nothing but the vertex count.
//!
//! Closed contours are split at an approximately farthest pair of points,
//! each half is simplified recursively, and a final pass drops vertices
//! on near-straight diagonal runs.

use crate::types::{Contour, Point, Polygon};

/// Rounds of "farthest point from the current anchor" used to pick the
/// two points a closed contour is split at.
const FARTHEST_PAIR_ROUNDS: usize = 3;

/// Closed-loop perimeter: sum of distances between consecutive points,
/// including the segment from the last point back to the first.
#[must_use]
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&a, &b)| a.distance(b))
        .sum()
}

/// Approximation tolerance for a contour: its perimeter divided by
/// `approximation_accuracy`.
#[must_use]
pub fn epsilon(points: &[Point], approximation_accuracy: f64) -> f64 {
    perimeter(points) / approximation_accuracy
}

/// Simplify one contour with a perimeter-relative tolerance.
#[must_use = "returns the approximating polygon"]
pub fn simplify_contour(contour: &Contour, approximation_accuracy: f64) -> Polygon {
    approximate_polygon(
        &contour.points,
        epsilon(&contour.points, approximation_accuracy),
    )
}

/// Simplify multiple contours, each with its own tolerance.
///
/// The output is index-aligned with the input.
#[must_use = "returns the approximating polygons"]
pub fn simplify_contours(contours: &[Contour], approximation_accuracy: f64) -> Vec<Polygon> {
    contours
        .iter()
        .map(|c| simplify_contour(c, approximation_accuracy))
        .collect()
}

/// Approximate a closed point sequence with a polygon whose edges stay
/// within `epsilon` of every dropped point.
///
/// The loop is split at an approximately farthest pair of points and
/// each half is simplified with the endpoint-fit recursion. If even that
/// pair lies within `epsilon`, the whole contour collapses to a single
/// vertex. Always returns at least one vertex for non-empty input.
#[must_use = "returns the approximating polygon"]
pub fn approximate_polygon(points: &[Point], epsilon: f64) -> Polygon {
    let n = points.len();
    if n < 2 {
        return Polygon::new(points.to_vec());
    }

    let (anchor, far) = farthest_pair(points);
    if points[anchor].distance(points[far]) <= epsilon {
        return Polygon::new(vec![points[anchor]]);
    }

    // Rotate so the anchor comes first, then close the ring onto it.
    let ring: Vec<Point> = points[anchor..]
        .iter()
        .chain(&points[..=anchor])
        .copied()
        .collect();
    let split = (far + n - anchor) % n;

    let mut kept = vec![false; n + 1];
    kept[0] = true;
    kept[split] = true;
    rdp_recurse(&ring, 0, split, epsilon, &mut kept);
    rdp_recurse(&ring, split, n, epsilon, &mut kept);

    let vertices: Vec<Point> = ring[..n]
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();

    Polygon::new(drop_straight_runs(vertices, epsilon))
}

/// Pick two points that are approximately farthest apart.
///
/// Starts at the first point and hops to the farthest point from the
/// current one a fixed number of times. Returns `(anchor, far)` where
/// `far` is the farthest point from `anchor`.
fn farthest_pair(points: &[Point]) -> (usize, usize) {
    let mut anchor = 0;
    let mut far = farthest_from(points, anchor);
    for _ in 1..FARTHEST_PAIR_ROUNDS {
        let next = farthest_from(points, far);
        anchor = far;
        far = next;
    }
    (anchor, far)
}

/// Index of the point farthest from `points[from]`; the first one wins
/// ties.
fn farthest_from(points: &[Point], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = origin.distance_squared(p);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// Uses the formula: |cross(b-a, p-a)| / |b-a|.
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = f64::from(b.x) - f64::from(a.x);
    let dy = f64::from(b.y) - f64::from(a.y);
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(f64::from(a.y) - f64::from(p.y), -(dy * (f64::from(a.x) - f64::from(p.x))));
    cross.abs() / length_sq.sqrt()
}

/// Final pass over the closed polygon: drop a vertex that sits between
/// its neighbours, within `epsilon / sqrt(2)` of the chord joining them,
/// on a chord that is neither horizontal nor vertical.
///
/// Each vertex is visited once; at least two vertices always remain.
fn drop_straight_runs(mut vertices: Vec<Point>, epsilon: f64) -> Vec<Point> {
    let limit = 0.5 * epsilon * epsilon;
    let total = vertices.len();
    let mut i = 0;

    for _ in 0..total {
        let n = vertices.len();
        if n <= 2 {
            break;
        }
        let idx = i % n;
        let prev = vertices[(idx + n - 1) % n];
        let cur = vertices[idx];
        let next = vertices[(idx + 1) % n];

        let dx = i64::from(next.x) - i64::from(prev.x);
        let dy = i64::from(next.y) - i64::from(prev.y);
        let ax = i64::from(cur.x) - i64::from(prev.x);
        let ay = i64::from(cur.y) - i64::from(prev.y);
        let bx = i64::from(next.x) - i64::from(cur.x);
        let by = i64::from(next.y) - i64::from(cur.y);

        let cross = ax * dy - ay * dx;
        let inner = ax * bx + ay * by;

        #[allow(clippy::cast_precision_loss)]
        let straight = dx != 0
            && dy != 0
            && inner >= 0
            && ((cross * cross) as f64) <= limit * ((dx * dx + dy * dy) as f64);

        if straight {
            vertices.remove(idx);
            i = idx;
        } else {
            i = idx + 1;
        }
    }
    vertices
}
