use geo::{coord, Contains, Coord, LineString, Polygon, Winding};
use itertools::Itertools;

use crate::geometry::functions::dist_euc2d;
use crate::geometry::{BoundingRect, ShapeId};

/// An ordered sequence of vertices describing one ring or path.
///
/// The bounding box is cached and kept in sync by every mutating method. Closed shapes repeat
/// their first vertex exactly at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    coords: Vec<Coord>,
    bbox: BoundingRect,
    parent: Option<ShapeId>,
}

/// Cumulative distances along a [`PointSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathDistances {
    /// Length of the segment from vertex `i` to vertex `i + 1`.
    pub segment_lengths: Vec<f64>,
    /// Distance along the path from the first vertex to vertex `i`.
    pub distance_to_vertex: Vec<f64>,
    pub total: f64,
}

impl PointSet {
    pub fn new(coords: Vec<Coord>) -> Self {
        let bbox = BoundingRect::from_coords(&coords);
        Self {
            coords,
            bbox,
            parent: None,
        }
    }

    pub fn with_parent(self, parent: ShapeId) -> Self {
        Self {
            parent: Some(parent),
            ..self
        }
    }

    pub fn from_line_string(line_string: &LineString) -> Self {
        Self::new(line_string.0.clone())
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn first(&self) -> Option<Coord> {
        self.coords.first().copied()
    }

    pub fn last(&self) -> Option<Coord> {
        self.coords.last().copied()
    }

    pub fn bounding_rect(&self) -> BoundingRect {
        self.bbox
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    /// Whether the first and last vertex coincide exactly.
    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords.first() == self.coords.last()
    }

    pub fn length(&self) -> f64 {
        self.coords
            .iter()
            .tuple_windows()
            .map(|(a, b)| dist_euc2d(*a, *b))
            .sum()
    }

    pub fn path_distances(&self) -> PathDistances {
        let segment_lengths = self
            .coords
            .iter()
            .tuple_windows()
            .map(|(a, b)| dist_euc2d(*a, *b))
            .collect::<Vec<_>>();

        let mut distance_to_vertex = Vec::with_capacity(self.coords.len());
        let mut total = 0.0;
        if !self.coords.is_empty() {
            distance_to_vertex.push(0.0);
        }
        for length in &segment_lengths {
            total += length;
            distance_to_vertex.push(total);
        }

        PathDistances {
            segment_lengths,
            distance_to_vertex,
            total,
        }
    }

    /// Point at `distance` along the path.
    ///
    /// Negative distances extrapolate from the first vertex along the chord joining the first
    /// and last vertices. Distances past the end clamp to the last vertex.
    pub fn point_by_distance(&self, distances: &PathDistances, distance: f64) -> Coord {
        let n = self.coords.len();
        if n == 0 {
            return coord! { x: 0., y: 0. };
        }

        let ad = &distances.distance_to_vertex;
        let mut i = 0;
        if distance >= 0.0 {
            while i < n && ad[i] <= distance {
                i += 1;
            }
            i = i.saturating_sub(1);
        }

        if i + 1 < n {
            let (dx, dy, di) = if distance < 0.0 {
                let dx = self.coords[n - 1].x - self.coords[0].x;
                let dy = self.coords[n - 1].y - self.coords[0].y;
                (dx, dy, dx.hypot(dy))
            } else {
                let dx = self.coords[i + 1].x - self.coords[i].x;
                let dy = self.coords[i + 1].y - self.coords[i].y;
                (dx, dy, distances.segment_lengths[i])
            };
            if di == 0.0 {
                return self.coords[i];
            }
            let remaining = distance - ad[i];
            coord! {
                x: self.coords[i].x + dx * remaining / di,
                y: self.coords[i].y + dy * remaining / di,
            }
        } else {
            self.coords[i]
        }
    }

    /// Extend the path by `start_distance` before its first vertex and `end_distance` after its
    /// last vertex.
    ///
    /// The extension direction is taken from the point `smooth_distance` along the path from
    /// each end, so a jagged final segment does not dictate where the extension points.
    pub fn extend_line_by_distance(
        &mut self,
        start_distance: f64,
        end_distance: f64,
        smooth_distance: f64,
    ) {
        if self.coords.len() < 2 {
            return;
        }

        let new_start = (start_distance > 0.0).then(|| {
            extension_point(self.coords.iter().copied(), start_distance, smooth_distance)
        });
        let new_end = (end_distance > 0.0).then(|| {
            extension_point(self.coords.iter().rev().copied(), end_distance, smooth_distance)
        });

        if let Some(Some(start)) = new_start {
            self.coords.insert(0, start);
            self.bbox.update(start);
        }
        if let Some(Some(end)) = new_end {
            self.coords.push(end);
            self.bbox.update(end);
        }
    }

    pub fn to_line_string(&self) -> LineString {
        LineString::new(self.coords.clone())
    }

    /// This ring as a polygon without holes.
    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.to_line_string(), vec![])
    }

    /// Whether `c` lies strictly inside this ring.
    pub fn contains_point(&self, c: Coord) -> bool {
        self.coords.len() >= 3 && self.to_polygon().contains(&c)
    }

    /// Reorder the vertices of this ring clockwise.
    pub fn make_clockwise(&mut self) {
        let mut ring = LineString::new(std::mem::take(&mut self.coords));
        ring.make_cw_winding();
        self.coords = ring.0;
    }

    pub fn is_clockwise(&self) -> bool {
        LineString::new(self.coords.clone()).is_cw()
    }
}

/// Point `distance` beyond the first vertex of `coords`, walking backwards from the point
/// `smooth_distance` along the path.
fn extension_point(
    coords: impl Iterator<Item = Coord>,
    distance: f64,
    smooth_distance: f64,
) -> Option<Coord> {
    let mut coords = coords;
    let origin = coords.next()?;

    let mut consumed = 0.0;
    let mut last = origin;
    let mut reference = origin;
    for this in coords {
        let segment_length = dist_euc2d(last, this);
        if segment_length == 0.0 {
            continue;
        }
        if consumed + segment_length >= smooth_distance {
            let along = (smooth_distance - consumed).max(0.0) / segment_length;
            reference = coord! {
                x: last.x + along * (this.x - last.x),
                y: last.y + along * (this.y - last.y),
            };
            if reference != origin {
                break;
            }
            reference = this;
            break;
        }
        consumed += segment_length;
        reference = this;
        last = this;
    }

    let span = dist_euc2d(reference, origin);
    if span == 0.0 {
        return None;
    }
    let factor = (distance + span) / span;
    Some(coord! {
        x: reference.x + (origin.x - reference.x) * factor,
        y: reference.y + (origin.y - reference.y) * factor,
    })
}
