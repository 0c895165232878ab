//! Labels inside polygons.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use geo::{BoundingRect as _, Centroid, Coord, InteriorPoint};

use crate::feature::FeaturePart;
use crate::geometry::functions::contains_candidate;
use crate::geometry::split::split_polygon;
use crate::geometry::CHullBox;
use crate::label_position::{LabelPosition, Quadrant};
use crate::log::debug;
use crate::placement::{candidate, PlacementContext};
use crate::settings::Arrangement;

const GRID_COST: f64 = 0.0001;
/// Boxes this many times larger than the feature's bounding box come from a broken split.
const MAX_BOX_AREA_RATIO: f64 = 5.0;

/// Anchor used when a polygon is labeled like a point: its centroid, or its interior point when
/// the layer requires the anchor inside the polygon and the centroid is not.
pub fn polygon_anchor(part: &FeaturePart) -> Option<Coord> {
    let polygon = part.polygon();
    let centroid = polygon.centroid()?.0;
    if part.layer().centroid_inside && !part.contains_point(centroid) {
        return polygon.interior_point().map(|p| p.0);
    }
    Some(centroid)
}

/// A single zero-cost candidate anchored at the polygon's interior point.
pub fn point_on_surface_candidate(part: &FeaturePart) -> Option<LabelPosition> {
    let point = part.polygon().interior_point()?;
    Some(candidate(
        part,
        point.x(),
        point.y(),
        0.0,
        0.0,
        false,
        Quadrant::Over,
    ))
}

/// Grid of candidates over the pieces of the split polygon.
///
/// Spacing starts at half the label size and is halved each time a pass finds nothing, for at
/// most 10 passes (7 with a permissible zone).
pub fn grid(part: &FeaturePart, ctx: &PlacementContext) -> Vec<LabelPosition> {
    let width = part.label_width();
    let height = part.label_height();
    if width <= 0.0 || height <= 0.0 {
        return vec![];
    }

    let shapes = split_polygon(&part.polygon(), width, height, ctx.cancel);
    let boxes = shapes
        .finals
        .iter()
        .filter_map(|id| shapes.arena.get(*id))
        .filter_map(|shape| shape.compute_chull_box())
        .collect::<Vec<_>>();
    if boxes.is_empty() {
        return vec![];
    }

    let max_passes = if part.feature().permissible_zone.is_some() {
        7
    } else {
        10
    };
    let mut dx = width / 2.0;
    let mut dy = height / 2.0;

    let mut positions = Vec::new();
    for pass in 0..max_passes {
        if ctx.cancel.is_cancelled() {
            debug!(part = part.id().0, pass, "grid placement cancelled");
            break;
        }

        positions = grid_pass(part, &boxes, dx, dy, ctx);
        if !positions.is_empty() {
            break;
        }
        dx /= 2.0;
        dy /= 2.0;
    }
    positions
}

/// Candidates from one pass over `boxes` with grid spacing `dx` by `dy`.
fn grid_pass(
    part: &FeaturePart,
    boxes: &[CHullBox],
    dx: f64,
    dy: f64,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    let width = part.label_width();
    let height = part.label_height();
    let arrangement = part.layer().arrangement;
    let feature_area = part.shape().bounding_rect().area();
    let zone_too_small = part.feature().permissible_zone.as_ref().map_or(false, |zone| {
        zone.bounding_rect()
            .map_or(true, |rect| rect.width() < width || rect.height() < height)
    });
    let diagonal = (width * width / 4.0 + height * height / 4.0).sqrt();

    let mut positions = Vec::new();
    for chull in boxes {
        if chull.area() > feature_area * MAX_BOX_AREA_RATIO {
            continue;
        }
        if arrangement == Arrangement::Horizontal && zone_too_small {
            continue;
        }
        positions.extend(box_candidates(part, chull, dx, dy, diagonal, ctx));
    }
    positions
}

/// Label angle for a box: unrotated when forced or when the label fits unrotated at the box
/// center, otherwise along the box's longer side.
fn box_angle(part: &FeaturePart, chull: &CHullBox) -> f64 {
    let width = part.label_width();
    let height = part.label_height();
    let arrangement = part.layer().arrangement;

    let fits_unrotated = arrangement == Arrangement::Free && {
        let center = chull.center();
        let (x0, y0) = (center.x - width, center.y - height);
        [
            (x0, y0),
            (x0 + 2.0 * width, y0),
            (x0, y0 + 2.0 * height),
            (x0 + 2.0 * width, y0 + 2.0 * height),
        ]
        .into_iter()
        .all(|(x, y)| part.contains_point(Coord { x, y }))
    };

    if arrangement == Arrangement::Horizontal || fits_unrotated {
        0.0
    } else if chull.length > 1.5 * width && chull.width > 1.5 * width {
        if chull.alpha <= FRAC_PI_4 {
            chull.alpha
        } else {
            chull.alpha - FRAC_PI_2
        }
    } else if chull.length > chull.width {
        chull.alpha - FRAC_PI_2
    } else {
        chull.alpha
    }
}

fn box_candidates(
    part: &FeaturePart,
    chull: &CHullBox,
    dx: f64,
    dy: f64,
    diagonal: f64,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    let width = part.label_width();
    let height = part.label_height();
    let zone = part.feature().permissible_zone.as_ref();

    let alpha = box_angle(part, chull);
    let beta = height.atan2(width) + alpha;
    let to_center_x = beta.cos() * diagonal;
    let to_center_y = beta.sin() * diagonal;

    // grid aligned so one point falls on the box center
    let px0 = chull.width / 2.0 - (chull.width / 2.0 / dx).ceil() * dx;
    let py0 = chull.length / 2.0 - (chull.length / 2.0 / dy).ceil() * dy;

    let origin = chull.corners[0];
    let (sin_a, cos_a) = chull.alpha.sin_cos();

    let mut positions = Vec::new();
    let mut px = px0;
    while px <= chull.width {
        if ctx.cancel.is_cancelled() {
            break;
        }
        let mut py = py0;
        while py <= chull.length {
            let cx = cos_a * px + sin_a * py + origin.x;
            let cy = sin_a * px - cos_a * py + origin.y;
            let x = cx - to_center_x;
            let y = cy - to_center_y;

            let accepted = match zone {
                Some(zone) => contains_candidate(zone, x, y, width, height, alpha),
                None => part.contains_point(Coord { x: cx, y: cy }),
            };
            if accepted {
                positions.push(candidate(part, x, y, alpha, GRID_COST, false, Quadrant::Over));
            }
            py += dy;
        }
        px += dx;
    }
    positions
}
