//! Small geometric helpers shared by the placement strategies.

use std::f64::consts::PI;
use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{coord, Contains, Coord, LineString, MultiPolygon, Polygon};

use crate::log::warn;

/// Tolerance used for "effectively equal" floating point comparisons.
pub(crate) const EPSILON: f64 = 4.0 * f64::EPSILON;

#[inline]
pub(crate) fn double_near(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

#[inline]
pub(crate) fn coords_near(a: Coord, b: Coord) -> bool {
    double_near(a.x, b.x) && double_near(a.y, b.y)
}

#[inline]
pub fn dist_euc2d(a: Coord, b: Coord) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Normalize an angle into `[0, 2π)`.
pub fn normalized_angle(angle: f64) -> f64 {
    let mut clipped = angle;
    if clipped >= 2.0 * PI || clipped <= -2.0 * PI {
        clipped %= 2.0 * PI;
    }
    if clipped < 0.0 {
        clipped += 2.0 * PI;
    }
    clipped
}

/// Signed cross product of `(p2 - p1) x (p3 - p1)`.
#[inline]
pub(crate) fn cross_product(p1: Coord, p2: Coord, p3: Coord) -> f64 {
    (p2.x - p1.x) * (p3.y - p1.y) - (p3.x - p1.x) * (p2.y - p1.y)
}

/// Intersect the circle centered on `center` with the segment `p1 -> p2`.
///
/// When two intersections exist the one furthest along the segment direction is returned.
pub fn line_circle_intersection(center: Coord, radius: f64, p1: Coord, p2: Coord) -> Option<Coord> {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    let a = dx * dx + dy * dy;
    let b = 2.0 * (dx * (p1.x - center.x) + dy * (p1.y - center.y));
    let c = (p1.x - center.x).powi(2) + (p1.y - center.y).powi(2) - radius * radius;

    let det = b * b - 4.0 * a * c;
    if a <= 1e-12 || det < 0.0 {
        return None;
    }

    let t = if double_near(det, 0.0) {
        -b / (2.0 * a)
    } else {
        (-b + det.sqrt()) / (2.0 * a)
    };
    Some(coord! { x: p1.x + t * dx, y: p1.y + t * dy })
}

/// Corners of a label rectangle anchored at its bottom-left corner and rotated by `alpha`
/// around that corner, counter-clockwise starting at the anchor.
pub fn label_corners(x: f64, y: f64, width: f64, height: f64, alpha: f64) -> [Coord; 4] {
    let (sin, cos) = alpha.sin_cos();
    let dx1 = width * cos;
    let dy1 = width * sin;
    let dx2 = -height * sin;
    let dy2 = height * cos;

    [
        coord! { x: x, y: y },
        coord! { x: x + dx1, y: y + dy1 },
        coord! { x: x + dx1 + dx2, y: y + dy1 + dy2 },
        coord! { x: x + dx2, y: y + dy2 },
    ]
}

pub fn label_polygon(x: f64, y: f64, width: f64, height: f64, alpha: f64) -> Polygon {
    let corners = label_corners(x, y, width, height, alpha);
    let mut ring = corners.to_vec();
    ring.push(corners[0]);
    Polygon::new(LineString::new(ring), vec![])
}

/// Whether the label rectangle lies entirely inside `zone`.
pub fn contains_candidate(
    zone: &MultiPolygon,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    alpha: f64,
) -> bool {
    let candidate = label_polygon(x, y, width, height, alpha);
    guarded("contains_candidate", || zone.contains(&candidate)).unwrap_or(false)
}

/// Run a call into the geometry engine, treating a panic as "no usable result".
///
/// Boolean operations and relate computations can panic on degenerate input; a single bad
/// feature must not abort the whole labeling pass.
pub(crate) fn guarded<T>(operation: &str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(operation, "geometry engine failure");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    #[test]
    fn angle_normalization() {
        assert_relative_eq!(normalized_angle(-PI / 2.0), 1.5 * PI);
        assert_relative_eq!(normalized_angle(5.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(normalized_angle(0.25), 0.25);
    }

    #[test]
    fn circle_crossing_segment() {
        let hit = line_circle_intersection(
            coord! { x: 0., y: 0. },
            5.,
            coord! { x: 0., y: 0. },
            coord! { x: 10., y: 0. },
        )
        .unwrap();
        assert_relative_eq!(hit.x, 5.);
        assert_relative_eq!(hit.y, 0.);

        // far side of a segment crossing the whole circle
        let hit = line_circle_intersection(
            coord! { x: 0., y: 0. },
            1.,
            coord! { x: -2., y: 0. },
            coord! { x: 2., y: 0. },
        )
        .unwrap();
        assert_relative_eq!(hit.x, 1.);

        assert!(line_circle_intersection(
            coord! { x: 0., y: 0. },
            1.,
            coord! { x: -2., y: 3. },
            coord! { x: 2., y: 3. },
        )
        .is_none());
    }

    #[test]
    fn rotated_corners() {
        let corners = label_corners(1., 1., 2., 1., PI / 2.0);
        assert_relative_eq!(corners[1].x, 1., epsilon = 1e-12);
        assert_relative_eq!(corners[1].y, 3.);
        assert_relative_eq!(corners[2].x, 0.);
        assert_relative_eq!(corners[2].y, 3.);
        assert_relative_eq!(corners[3].x, 0.);
    }

    #[test]
    fn candidate_in_zone() {
        let zone = MultiPolygon::new(vec![polygon![
            (x: 0., y: 0.),
            (x: 10., y: 0.),
            (x: 10., y: 10.),
            (x: 0., y: 10.),
            (x: 0., y: 0.),
        ]]);
        assert!(contains_candidate(&zone, 1., 1., 4., 2., 0.));
        assert!(!contains_candidate(&zone, 8., 1., 4., 2., 0.));
    }
}
