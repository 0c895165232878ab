//! Decomposition of concave polygons into pieces that can each host a label grid.

use geo::{coord, Area, BooleanOps, ConvexHull, Coord, LineString, Polygon};

use crate::cancel::CancellationToken;
use crate::geometry::functions::{cross_product, guarded, EPSILON};
use crate::geometry::{PointSet, ShapeArena, ShapeId};
use crate::log::debug;

/// Upper bound on the number of cuts performed for a single polygon.
const MAX_SPLITS: usize = 128;

/// Result of [`split_polygon`].
#[derive(Debug, Clone, Default)]
pub struct SplitShapes {
    /// Every shape produced while splitting, linked to the shape it was cut from.
    pub arena: ShapeArena,
    /// Exterior rings that were not split any further.
    pub finals: Vec<ShapeId>,
}

/// Deepest concavity of a ring relative to its convex hull.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Concavity {
    /// Twice the area of the triangle formed by the hull edge and the retained vertex.
    measure: f64,
    vertex: Coord,
    hull_start: Coord,
    hull_end: Coord,
}

/// Recursively cut `polygon` at its deepest concavity until every piece is either convex
/// enough or its concavities are smaller than a label of `label_width` x `label_height`.
///
/// Returns an empty result when cancelled.
pub fn split_polygon(
    polygon: &Polygon,
    label_width: f64,
    label_height: f64,
    cancel: &CancellationToken,
) -> SplitShapes {
    let label_area = label_width * label_height;
    let mut result = SplitShapes::default();

    let root = result
        .arena
        .push(PointSet::from_line_string(polygon.exterior()));
    let mut to_process = vec![(root, polygon.clone())];
    let mut splits = 0;

    while let Some((id, shape)) = to_process.pop() {
        if cancel.is_cancelled() {
            debug!("polygon split cancelled");
            return SplitShapes::default();
        }

        let pieces = if splits < MAX_SPLITS {
            deepest_concavity(shape.exterior())
                .filter(|concavity| concavity.measure > label_area)
                .and_then(|concavity| cut(&shape, &concavity))
        } else {
            None
        };

        match pieces {
            Some(pieces) => {
                splits += 1;
                for piece in pieces {
                    let child = result
                        .arena
                        .push(PointSet::from_line_string(piece.exterior()).with_parent(id));
                    to_process.push((child, piece));
                }
            }
            None => result.finals.push(id),
        }
    }

    result.finals.sort();
    result
}

fn deepest_concavity(ring: &LineString) -> Option<Concavity> {
    let mut coords = ring.0.clone();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    let n = coords.len();
    if n < 4 {
        return None;
    }

    // walk the ring in the same (counter-clockwise) order as the hull
    let mut ccw = LineString::new(coords.clone());
    ccw.close();
    geo::Winding::make_ccw_winding(&mut ccw);
    let mut coords = ccw.0;
    coords.pop();

    let hull = ccw_hull_indices(&coords);
    if hull.len() < 3 {
        return None;
    }

    let mut best: Option<Concavity> = None;
    for (ih, &ps) in hull.iter().enumerate() {
        let pe = hull[(ih + 1) % hull.len()];
        if (ps + 1) % n == pe {
            continue;
        }
        let mut i = ps;
        while i != pe {
            let measure = cross_product(coords[ps], coords[pe], coords[i]).abs();
            if best.map_or(measure > EPSILON, |best| measure - best.measure > EPSILON) {
                best = Some(Concavity {
                    measure,
                    vertex: coords[i],
                    hull_start: coords[ps],
                    hull_end: coords[pe],
                });
            }
            i = (i + 1) % n;
        }
    }
    best
}

/// Indices into `coords` of the convex hull vertices, in ring order.
fn ccw_hull_indices(coords: &[Coord]) -> Vec<usize> {
    let hull = LineString::new(coords.to_vec()).convex_hull();
    let mut indices = hull
        .exterior()
        .0
        .iter()
        .filter_map(|c| coords.iter().position(|p| p == c))
        .collect::<Vec<_>>();
    indices.dedup();
    if indices.len() > 1 && indices.first() == indices.last() {
        indices.pop();
    }
    // rotate so indices increase along the ring
    if let Some(start) = indices
        .iter()
        .enumerate()
        .min_by_key(|(_, i)| **i)
        .map(|(pos, _)| pos)
    {
        indices.rotate_left(start);
    }
    indices
}

/// Split `shape` along the line through the concavity's vertex, perpendicular to its hull edge.
fn cut(shape: &Polygon, concavity: &Concavity) -> Option<Vec<Polygon>> {
    let dx = concavity.hull_end.x - concavity.hull_start.x;
    let dy = concavity.hull_end.y - concavity.hull_start.y;
    let norm = dx.hypot(dy);
    if norm == 0.0 {
        return None;
    }
    let d = coord! { x: dx / norm, y: dy / norm };
    let n = coord! { x: -d.y, y: d.x };

    let rect = geo::BoundingRect::bounding_rect(shape)?;
    let reach = 2.0 * (rect.width() + rect.height()) + 1.0;
    let r = concavity.vertex;

    let half_plane = |sign: f64| {
        let far = coord! { x: r.x + sign * d.x * reach, y: r.y + sign * d.y * reach };
        Polygon::new(
            LineString::new(vec![
                coord! { x: r.x - n.x * reach, y: r.y - n.y * reach },
                coord! { x: r.x + n.x * reach, y: r.y + n.y * reach },
                coord! { x: far.x + n.x * reach, y: far.y + n.y * reach },
                coord! { x: far.x - n.x * reach, y: far.y - n.y * reach },
                coord! { x: r.x - n.x * reach, y: r.y - n.y * reach },
            ]),
            vec![],
        )
    };

    let min_area = shape.unsigned_area() * 1e-9;
    let mut pieces = Vec::new();
    for sign in [1.0, -1.0] {
        let clip = half_plane(sign);
        let part = guarded("split_polygon", || shape.intersection(&clip))?;
        pieces.extend(
            part.0
                .into_iter()
                .filter(|piece| piece.unsigned_area() > min_area),
        );
    }

    (pieces.len() >= 2).then_some(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::polygon::{l_shape, square};
    use approx::assert_relative_eq;

    #[test]
    fn convex_polygon_is_not_split() {
        let shapes = split_polygon(&square(0., 0., 10.), 2., 1., &CancellationToken::new());
        assert_eq!(shapes.finals, vec![ShapeId(0)]);
        assert_eq!(shapes.arena.len(), 1);
    }

    #[test]
    fn l_shape_is_split_in_two() {
        let shape = l_shape();
        let shapes = split_polygon(&shape, 0.5, 0.5, &CancellationToken::new());
        assert_eq!(shapes.finals.len(), 2);

        let total: f64 = shapes
            .finals
            .iter()
            .map(|id| shapes.arena.get(*id).unwrap().to_polygon().unsigned_area())
            .sum();
        assert_relative_eq!(total, shape.unsigned_area(), epsilon = 1e-9);

        for id in &shapes.finals {
            assert_eq!(shapes.arena.parent_of(*id), Some(ShapeId(0)));
        }
    }

    #[test]
    fn small_concavity_is_kept() {
        // pocket measure is well below the label area
        let shapes = split_polygon(&l_shape(), 10., 10., &CancellationToken::new());
        assert_eq!(shapes.finals, vec![ShapeId(0)]);
    }

    #[test]
    fn cancelled_split_is_empty() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let shapes = split_polygon(&l_shape(), 0.5, 0.5, &cancel);
        assert!(shapes.finals.is_empty());
    }
}
