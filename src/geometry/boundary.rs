use geo::{BooleanOps, Contains, Intersects, MultiPolygon, Polygon, Rect};

use crate::geometry::functions::guarded;
use crate::label_position::LabelPosition;
use crate::log::warn;

/// Region of the map candidates must fall in.
///
/// Usually the visible extent, with any blocking regions carved away.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelingBoundary {
    geometry: MultiPolygon,
}

impl LabelingBoundary {
    pub fn new(geometry: MultiPolygon) -> Self {
        Self { geometry }
    }

    pub fn from_rect(extent: Rect) -> Self {
        Self::new(MultiPolygon::new(vec![extent.to_polygon()]))
    }

    /// Remove `regions` from the boundary. A region the geometry engine fails on is ignored.
    pub fn with_blocking_regions<'a>(self, regions: impl IntoIterator<Item = &'a Polygon>) -> Self {
        let mut geometry = self.geometry;
        for region in regions {
            let blocker = MultiPolygon::new(vec![region.clone()]);
            match guarded("blocking_region", || geometry.difference(&blocker)) {
                Some(carved) => geometry = carved,
                None => warn!("ignoring blocking region"),
            }
        }
        Self { geometry }
    }

    pub fn geometry(&self) -> &MultiPolygon {
        &self.geometry
    }

    /// Whether every part of `candidate` lies inside the boundary.
    pub fn contains_candidate(&self, candidate: &LabelPosition) -> bool {
        candidate.part_polygons().all(|part| {
            guarded("boundary_within", || self.geometry.contains(&part)).unwrap_or(false)
        })
    }

    /// Whether any part of `candidate` touches the boundary.
    pub fn intersects_candidate(&self, candidate: &LabelPosition) -> bool {
        candidate.part_polygons().any(|part| {
            guarded("boundary_intersects", || self.geometry.intersects(&part)).unwrap_or(false)
        })
    }
}

impl From<Rect> for LabelingBoundary {
    fn from(value: Rect) -> Self {
        Self::from_rect(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::PartId;
    use crate::label_position::Quadrant;
    use crate::test::polygon::square;
    use approx::assert_relative_eq;
    use geo::{coord, Area};

    fn candidate(x: f64, y: f64) -> LabelPosition {
        LabelPosition::new(0, x, y, 2., 1., 0., 0.001, PartId::default(), false, Quadrant::Over)
    }

    #[test]
    fn within_and_partial() {
        let boundary =
            LabelingBoundary::from_rect(Rect::new(coord! { x: 0., y: 0. }, coord! { x: 10., y: 10. }));

        let inside = candidate(1., 1.);
        assert!(boundary.contains_candidate(&inside));
        assert!(boundary.intersects_candidate(&inside));

        let straddling = candidate(9., 1.);
        assert!(!boundary.contains_candidate(&straddling));
        assert!(boundary.intersects_candidate(&straddling));

        let outside = candidate(20., 20.);
        assert!(!boundary.intersects_candidate(&outside));
    }

    #[test]
    fn blocking_regions_are_carved() {
        let blocker = square(0., 0., 5.);
        let boundary =
            LabelingBoundary::from_rect(Rect::new(coord! { x: 0., y: 0. }, coord! { x: 10., y: 10. }))
                .with_blocking_regions([&blocker]);
        assert_relative_eq!(boundary.geometry().unsigned_area(), 75., epsilon = 1e-9);
        assert!(!boundary.contains_candidate(&candidate(1., 1.)));
        assert!(boundary.contains_candidate(&candidate(6., 6.)));
    }
}
