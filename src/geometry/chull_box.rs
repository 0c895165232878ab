use std::f64::consts::FRAC_PI_2;

use geo::{coord, ConvexHull, Coord, LineString};
use itertools::Itertools;

use crate::geometry::PointSet;

/// Minimum-area oriented bounding box of a point set.
///
/// ```text
///      c0 ---- width (along alpha) ---- c1
///      |                                |
///   length (along alpha - π/2)          |
///      |                                |
///      c3 ----------------------------- c2
/// ```
///
/// `alpha` is normalized into `[0, π/2)`; the box covers every point
/// `c0 + px * (cos alpha, sin alpha) + py * (cos(alpha - π/2), sin(alpha - π/2))` with
/// `px` in `[0, width]` and `py` in `[0, length]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CHullBox {
    pub corners: [Coord; 4],
    pub alpha: f64,
    pub width: f64,
    pub length: f64,
}

impl CHullBox {
    pub fn area(&self) -> f64 {
        self.width * self.length
    }

    pub fn center(&self) -> Coord {
        coord! {
            x: (self.corners[0].x + self.corners[2].x) / 2.,
            y: (self.corners[0].y + self.corners[2].y) / 2.,
        }
    }

    /// Box sides aligned with `alpha`, enclosing `points`.
    fn aligned(points: &[Coord], alpha: f64) -> Self {
        let (sin, cos) = alpha.sin_cos();
        let u = coord! { x: cos, y: sin };
        let v = coord! { x: sin, y: -cos };

        let (umin, umax) = points
            .iter()
            .map(|p| p.x * u.x + p.y * u.y)
            .minmax()
            .into_option()
            .unwrap_or((0., 0.));
        let (vmin, vmax) = points
            .iter()
            .map(|p| p.x * v.x + p.y * v.y)
            .minmax()
            .into_option()
            .unwrap_or((0., 0.));

        let width = umax - umin;
        let length = vmax - vmin;
        let c0 = coord! { x: u.x * umin + v.x * vmin, y: u.y * umin + v.y * vmin };
        let c1 = coord! { x: c0.x + u.x * width, y: c0.y + u.y * width };
        let c2 = coord! { x: c1.x + v.x * length, y: c1.y + v.y * length };
        let c3 = coord! { x: c0.x + v.x * length, y: c0.y + v.y * length };

        Self {
            corners: [c0, c1, c2, c3],
            alpha,
            width,
            length,
        }
    }
}

impl PointSet {
    /// Minimum-area bounding box over the edges of this shape's convex hull.
    pub fn compute_chull_box(&self) -> Option<CHullBox> {
        if self.is_empty() {
            return None;
        }

        let hull = LineString::new(self.coords().to_vec()).convex_hull();
        let hull_points = hull.exterior().0.as_slice();

        let mut best: Option<CHullBox> = None;
        for (a, b) in hull_points.iter().tuple_windows() {
            if a == b {
                continue;
            }
            let alpha = (b.y - a.y).atan2(b.x - a.x).rem_euclid(FRAC_PI_2);
            let candidate = CHullBox::aligned(hull_points, alpha);
            if best.map_or(true, |best| candidate.area() < best.area()) {
                best = Some(candidate);
            }
        }

        Some(best.unwrap_or_else(|| CHullBox::aligned(self.coords(), 0.)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::polygon::square_ring;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn axis_aligned_rectangle() {
        let shape = PointSet::new(vec![
            coord! { x: 0., y: 0. },
            coord! { x: 6., y: 0. },
            coord! { x: 6., y: 2. },
            coord! { x: 0., y: 2. },
            coord! { x: 0., y: 0. },
        ]);
        let bbox = shape.compute_chull_box().unwrap();
        assert_relative_eq!(bbox.alpha, 0.);
        assert_relative_eq!(bbox.width, 6.);
        assert_relative_eq!(bbox.length, 2.);
        assert_relative_eq!(bbox.area(), 12.);
        assert_relative_eq!(bbox.center().x, 3.);
        assert_relative_eq!(bbox.center().y, 1.);
    }

    #[test]
    fn rotated_square() {
        let diamond = PointSet::new(vec![
            coord! { x: 0., y: -1. },
            coord! { x: 1., y: 0. },
            coord! { x: 0., y: 1. },
            coord! { x: -1., y: 0. },
            coord! { x: 0., y: -1. },
        ]);
        let bbox = diamond.compute_chull_box().unwrap();
        assert_relative_eq!(bbox.alpha, FRAC_PI_4, epsilon = 1e-12);
        assert_relative_eq!(bbox.area(), 2., epsilon = 1e-12);
        assert_relative_eq!(bbox.center().x, 0., epsilon = 1e-12);
        assert_relative_eq!(bbox.center().y, 0., epsilon = 1e-12);
    }

    #[test]
    fn box_contains_its_shape() {
        let shape = PointSet::new(square_ring(3., 4., 5.));
        let bbox = shape.compute_chull_box().unwrap();
        let (sin, cos) = bbox.alpha.sin_cos();
        for p in shape.coords() {
            let dx = p.x - bbox.corners[0].x;
            let dy = p.y - bbox.corners[0].y;
            let px = dx * cos + dy * sin;
            let py = dx * sin - dy * cos;
            assert!(px > -1e-9 && px < bbox.width + 1e-9);
            assert!(py > -1e-9 && py < bbox.length + 1e-9);
        }
    }
}
