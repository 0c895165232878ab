//! Connectivity between feature parts and continuous-line merging.

use geo::{Coord, LineString, Relate};

use crate::feature::part::{FeaturePart, GeometryKind};
use crate::geometry::functions::guarded;
use crate::geometry::{PointSet, ShapeArena};
use crate::log::debug;

/// DE-9IM patterns matching geometries that touch without sharing interior points.
const TOUCHES: [&str; 3] = ["FT*******", "F**T*****", "F***T****"];

impl FeaturePart {
    /// Whether both geometries touch: they share boundary points but no interior.
    pub fn is_connected(&self, other: &FeaturePart) -> bool {
        let a = self.to_geometry();
        let b = other.to_geometry();
        guarded("is_connected", || {
            let matrix = a.relate(&b);
            TOUCHES
                .iter()
                .any(|pattern| matrix.matches(pattern).unwrap_or(false))
        })
        .unwrap_or(false)
    }

    /// Join `other` onto this line when both share an endpoint.
    ///
    /// On success the coordinates are replaced by the merged line and any holes are dropped.
    /// Returns `false`, leaving this part unchanged, when the lines cannot be merged into a
    /// single line.
    pub fn merge_with(&mut self, other: &FeaturePart) -> bool {
        if self.kind() != GeometryKind::Line || other.kind() != GeometryKind::Line {
            return false;
        }

        match line_merge(self.shape().coords(), other.shape().coords()) {
            Some(merged) => {
                let mut shapes = ShapeArena::new();
                shapes.push(PointSet::new(merged));
                self.shapes = shapes;
                true
            }
            None => {
                debug!(part = self.id().0, other = other.id().0, "lines do not share an endpoint");
                false
            }
        }
    }

    /// Cut a line into consecutive chunks so each chunk can host its own repeated label.
    ///
    /// The chunk length is the feature's repeat distance rounded up to a whole multiple that
    /// fits the label width. Returns the whole line when no repeat distance is set.
    pub fn chop_at_repeat_distance(&self) -> Vec<LineString> {
        let repeat = self.feature().repeat_distance;
        let coords = self.shape().coords();
        if self.kind() != GeometryKind::Line || repeat <= 0.0 || coords.len() < 2 {
            return vec![self.shape().to_line_string()];
        }
        let interval = repeat * (self.label_width() / repeat).ceil().max(1.0);

        let distances = self.shape().path_distances();
        let along = &distances.distance_to_vertex;
        let n = coords.len();

        let mut chunks = Vec::new();
        let mut chunk: Vec<Coord> = Vec::new();
        let mut current = 0;
        let mut lambda = 0.0;
        loop {
            lambda += interval;
            while current < n && lambda > along[current] {
                chunk.push(coords[current]);
                current += 1;
            }
            if current >= n {
                if chunk.windows(2).any(|pair| pair[0] != pair[1]) {
                    chunks.push(LineString::new(chunk));
                }
                break;
            }

            let span = along[current] - along[current - 1];
            let c = if span > 0.0 {
                (lambda - along[current - 1]) / span
            } else {
                0.0
            };
            let p = Coord {
                x: coords[current - 1].x + c * (coords[current].x - coords[current - 1].x),
                y: coords[current - 1].y + c * (coords[current].y - coords[current - 1].y),
            };
            chunk.push(p);
            chunks.push(LineString::new(std::mem::take(&mut chunk)));
            chunk.push(p);
        }
        chunks
    }
}

/// Join two paths sharing an endpoint into one, in the direction of `a`.
fn line_merge(a: &[Coord], b: &[Coord]) -> Option<Vec<Coord>> {
    let (a_first, a_last) = (a.first()?, a.last()?);
    let (b_first, b_last) = (b.first()?, b.last()?);

    let joined = if a_last == b_first {
        a.iter().chain(b.iter().skip(1)).copied().collect()
    } else if a_last == b_last {
        a.iter().chain(b.iter().rev().skip(1)).copied().collect()
    } else if a_first == b_last {
        b.iter().chain(a.iter().skip(1)).copied().collect()
    } else if a_first == b_first {
        b.iter().rev().chain(a.iter().skip(1)).copied().collect()
    } else {
        return None;
    };
    Some(joined)
}
