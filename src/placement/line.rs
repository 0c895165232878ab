//! Straight labels along lines and polygon perimeters.

use std::f64::consts::{FRAC_PI_2, PI};

use geo::Coord;

use crate::feature::FeaturePart;
use crate::geometry::functions::{coords_near, dist_euc2d, normalized_angle};
use crate::geometry::PointSet;
use crate::label_position::{LabelPosition, Quadrant};
use crate::placement::{candidate, in_permissible_zone, PlacementContext};
use crate::settings::{Arrangement, LinePlacementFlags};

/// Vertices turning by more than 45° either way split the line into separate runs.
const HARD_BREAK_MIN: f64 = 135.0 * PI / 180.0;
const HARD_BREAK_MAX: f64 = 225.0 * PI / 180.0;

#[derive(Debug, Clone, Copy)]
enum Side {
    Above,
    Below,
    OnLine,
}

/// Emission order for windows found on straight runs.
const RUN_ORDER: [Side; 3] = [Side::Below, Side::Above, Side::OnLine];
/// Emission order for windows slid over the whole line.
const MIDPOINT_ORDER: [Side; 3] = [Side::Above, Side::Below, Side::OnLine];

/// Straight candidates along `line`.
///
/// Windows are first searched on the straight runs between hard breaks. When that yields fewer
/// candidates than the engine's line hint, windows slid along the whole line are added at a
/// slightly higher cost. `allow_overrun` lets a label hang past the ends of an open line by the
/// feature's overrun distance.
pub fn along_line(
    part: &FeaturePart,
    line: &PointSet,
    allow_overrun: bool,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    if line.len() < 2 {
        return vec![];
    }

    let width = part.label_width();
    if allow_overrun {
        let length = line.length();
        let overrun = part.feature().overrun_distance;
        if part.total_repeats() > 1 && length < width {
            return vec![];
        } else if length < width - 2.0 * width.min(overrun) {
            return vec![];
        }
    }

    let flags = part.layer().line_flags.effective();
    let mut positions = along_straight_runs(part, line, flags, ctx);
    if positions.len() < ctx.settings.candidates_line {
        let initial_cost = if positions.is_empty() { 0.0 } else { 0.01 };
        positions.extend(along_whole_line(part, line, flags, initial_cost, ctx));
    }
    positions
}

/// Cost of a window whose chord is shorter than the label, free when the fit is within 2%.
fn window_cost(candidate_length: f64, width: f64) -> f64 {
    let ratio = candidate_length / width;
    if ratio > 0.98 {
        0.0001
    } else {
        (1.0 - ratio) / 100.0
    }
}

fn window_angle(start: Coord, end: Coord) -> f64 {
    if coords_near(start, end) {
        0.0
    } else {
        (end.y - start.y).atan2(end.x - start.x)
    }
}

fn step_for(part: &FeaturePart, remaining: f64, ctx: &PlacementContext) -> f64 {
    part.label_height()
        .min(part.label_width())
        .min(remaining / ctx.settings.candidates_line as f64)
}

fn along_straight_runs(
    part: &FeaturePart,
    line: &PointSet,
    flags: LinePlacementFlags,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    let coords = line.coords();
    let n = coords.len();
    let width = part.label_width();
    let closed = coords_near(coords[0], coords[n - 1]);

    let mut breaks = Vec::new();
    let last_scanned = if closed { n - 1 } else { n - 2 };
    for i in 1..=last_scanned {
        let p1 = coords[i - 1];
        let p2 = coords[i];
        // closed rings wrap around past the repeated closing vertex
        let p3 = coords[if i == n - 1 { 1 } else { i + 1 }];
        if coords_near(p2, p3) || coords_near(p1, p2) {
            continue;
        }
        let vertex_angle = normalized_angle(
            PI - ((p3.y - p2.y).atan2(p3.x - p2.x) - (p2.y - p1.y).atan2(p2.x - p1.x)),
        );
        if !(HARD_BREAK_MIN..=HARD_BREAK_MAX).contains(&vertex_angle) {
            breaks.push(i);
        }
    }
    breaks.push(n - 1);

    let distances = line.path_distances();
    let mut run_lengths = Vec::new();
    let mut run_angles = Vec::new();
    let mut current_length = 0.0;
    let mut longest = 0.0_f64;
    let mut run_start = coords[0];
    for i in 0..n - 1 {
        if breaks.contains(&i) {
            run_lengths.push(current_length);
            run_angles.push(normalized_angle(
                (coords[i].y - run_start.y).atan2(coords[i].x - run_start.x),
            ));
            longest = longest.max(current_length);
            current_length = 0.0;
            run_start = coords[i];
        }
        current_length += distances.segment_lengths[i];
    }
    run_lengths.push(current_length);
    run_angles.push(normalized_angle(
        (coords[n - 1].y - run_start.y).atan2(coords[n - 1].x - run_start.x),
    ));
    longest = longest.max(current_length);

    let total = distances.total;
    if total < width {
        return vec![];
    }
    let step = step_for(part, total - width, ctx);
    if step <= 0.0 {
        return vec![];
    }
    let middle = total / 2.0;

    let mut positions = Vec::new();
    let mut end_distance = 0.0;
    for (i, (&run_length, &run_angle)) in run_lengths.iter().zip(&run_angles).enumerate() {
        let Some(&last_vertex) = breaks.get(i) else {
            break;
        };
        let start_distance = end_distance;
        end_distance = distances.distance_to_vertex[last_vertex];
        let run_center = 0.5 * (start_distance + end_distance);
        if run_length < width {
            continue;
        }

        let run_span = end_distance - start_distance;
        let run_cost = 1.0 - run_span / longest;
        let angle_cost = 1.0 - ((run_angle % PI) - FRAC_PI_2).abs() / FRAC_PI_2;

        let mut current = start_distance;
        while current + width < end_distance {
            let start = line.point_by_distance(&distances, current);
            let end = line.point_by_distance(&distances, current + width);

            let mut cost = window_cost(dist_euc2d(start, end), width);
            let label_center = current + width / 2.0;
            cost += 2.0 * (label_center - run_center).abs() / run_span * 0.0005;
            if !closed {
                cost += 2.0 * (label_center - middle).abs() / total * 0.0005;
            }
            cost += run_cost * 0.0005;
            cost += angle_cost * 0.0001;

            let angle = window_angle(start, end);
            positions.extend(window_candidates(part, flags, start, angle, cost, RUN_ORDER));
            current += step;
        }
    }
    positions
}

fn along_whole_line(
    part: &FeaturePart,
    line: &PointSet,
    flags: LinePlacementFlags,
    initial_cost: f64,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    let width = part.label_width();
    let distances = line.path_distances();
    let mut total = distances.total;

    let mut current = 0.0;
    let step;
    if total > width {
        step = step_for(part, total - width, ctx);
    } else if !line.is_closed() {
        // center the label over a line shorter than itself
        current = -(width - total) / 2.0;
        step = -1.0;
        total = width;
    } else {
        // a closed ring shorter than the label has no sensible center
        return vec![];
    }
    if step == 0.0 {
        return vec![];
    }

    let mut positions = Vec::new();
    while current < total - width {
        let start = line.point_by_distance(&distances, current);
        let end = line.point_by_distance(&distances, current + width);
        let candidate_length = match (current < 0.0, line.first(), line.last()) {
            (true, Some(first), Some(last)) => dist_euc2d(first, last),
            _ => dist_euc2d(start, end),
        };

        let mut cost = window_cost(candidate_length, width);
        cost += (total / 2.0 - (current + width / 2.0)).abs() / total / 1000.0;
        cost += initial_cost;

        let angle = window_angle(start, end);
        positions.extend(window_candidates(part, flags, start, angle, cost, MIDPOINT_ORDER));

        current += step;
        if step < 0.0 {
            break;
        }
    }
    positions
}

/// Candidates for one window starting at `start` and pointing along `angle`.
fn window_candidates(
    part: &FeaturePart,
    flags: LinePlacementFlags,
    start: Coord,
    angle: f64,
    cost: f64,
    order: [Side; 3],
) -> Vec<LabelPosition> {
    let width = part.label_width();
    let height = part.label_height();

    match part.layer().arrangement {
        Arrangement::Line => {
            let distance = part.distance_label();
            let right_to_left = angle > FRAC_PI_2 || angle <= -FRAC_PI_2;
            let reversed = flags.map_orientation && right_to_left;
            let above = (!reversed && flags.above_line) || (reversed && flags.below_line);
            let below = (!reversed && flags.below_line) || (reversed && flags.above_line);
            let (sin_beta, cos_beta) = (angle + FRAC_PI_2).sin_cos();

            order
                .iter()
                .filter_map(|side| {
                    let (x, y, bias) = match side {
                        Side::Below if below => (
                            start.x - cos_beta * (distance + height),
                            start.y - sin_beta * (distance + height),
                            if reversed { 0.0 } else { 0.001 },
                        ),
                        Side::Above if above => (
                            start.x + cos_beta * distance,
                            start.y + sin_beta * distance,
                            if reversed { 0.001 } else { 0.0 },
                        ),
                        Side::OnLine if flags.on_line => (
                            start.x - height * cos_beta / 2.0,
                            start.y - height * sin_beta / 2.0,
                            0.002,
                        ),
                        _ => return None,
                    };
                    in_permissible_zone(part, x, y, angle).then(|| {
                        candidate(
                            part,
                            x,
                            y,
                            angle,
                            cost + bias,
                            right_to_left,
                            Quadrant::Over,
                        )
                    })
                })
                .collect()
        }
        Arrangement::Horizontal => vec![candidate(
            part,
            start.x - width / 2.0,
            start.y - height / 2.0,
            0.0,
            cost,
            false,
            Quadrant::Over,
        )],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::feature::{FeatureId, LabelFeature};
    use crate::settings::{EngineSettings, LayerSettings};
    use crate::test::layer;
    use crate::test::linestring::{bent_line, small_loop, straight_line};
    use approx::assert_relative_eq;
    use geo::{Geometry, LineString};
    use std::sync::Arc;

    fn line_part(line: LineString, width: f64, layer_settings: LayerSettings) -> FeaturePart {
        let geometry = Geometry::LineString(line);
        let feature = LabelFeature::new(FeatureId(1), geometry.clone(), width, 1.);
        FeaturePart::try_new(Arc::new(feature), Arc::new(layer_settings), &geometry).unwrap()
    }

    fn generate(part: &FeaturePart, allow_overrun: bool) -> Vec<LabelPosition> {
        let settings = EngineSettings::default();
        let cancel = CancellationToken::new();
        along_line(part, part.shape(), allow_overrun, &PlacementContext::new(&settings, &cancel))
    }

    #[test]
    fn closed_loop_shorter_than_label() {
        let part = line_part(small_loop(), 5., layer(Arrangement::Line));
        assert!(generate(&part, false).is_empty());
    }

    #[test]
    fn straight_runs_on_ten_unit_line() {
        let part = line_part(straight_line(10.), 4., layer(Arrangement::Line));
        let settings = EngineSettings::default();
        let cancel = CancellationToken::new();
        let ctx = PlacementContext::new(&settings, &cancel);
        let flags = part.layer().line_flags.effective();

        let positions = along_straight_runs(&part, part.shape(), flags, &ctx);
        // step is min(1, 4, 6 / 8) = 0.75 over windows starting at 0..=5.25
        assert_eq!(positions.len(), 8);
        for pair in positions.windows(2) {
            assert_relative_eq!(pair[1].x() - pair[0].x(), 0.75, epsilon = 1e-9);
        }
        for position in &positions {
            assert_relative_eq!(position.width(), 4.);
            assert_relative_eq!(position.height(), 1.);
            assert_relative_eq!(position.alpha(), 0.);
            assert_relative_eq!(position.y(), -0.5);
        }

        // the window starting at 3 is centered on the line
        let cheapest = positions
            .iter()
            .min_by(|a, b| a.cost().total_cmp(&b.cost()))
            .unwrap();
        assert_relative_eq!(cheapest.x(), 3., epsilon = 1e-9);
        // perfect fit 0.0001 + on-line bias 0.002, the single horizontal run costs nothing
        assert_relative_eq!(cheapest.cost(), 0.0021, epsilon = 1e-12);

        // enough candidates were found on the run, no whole-line windows are added
        assert_eq!(generate(&part, true).len(), 8);
    }

    #[test]
    fn sides_follow_flags() {
        let flags = LinePlacementFlags {
            above_line: true,
            below_line: true,
            ..Default::default()
        };
        let part = line_part(
            straight_line(10.),
            4.,
            layer(Arrangement::Line).with_line_flags(flags),
        );
        let positions = generate(&part, true);
        assert_eq!(positions.len(), 16);

        // below first, then above
        assert_relative_eq!(positions[0].y(), -1.);
        assert_relative_eq!(positions[1].y(), 0.);
        assert_relative_eq!(positions[0].cost() - positions[1].cost(), 0.001, epsilon = 1e-12);
    }

    #[test]
    fn right_to_left_lines_are_turned_upright() {
        let line: LineString = vec![(10., 0.), (0., 0.)].into();
        let part = line_part(line, 4., layer(Arrangement::Line));
        let positions = generate(&part, true);
        assert!(!positions.is_empty());
        for position in &positions {
            assert_relative_eq!(position.alpha(), 0., epsilon = 1e-9);
            // reversed by the line direction, then toggled back by the upright correction
            assert!(!position.is_reversed());
        }
    }

    #[test]
    fn map_orientation_swaps_sides_on_right_to_left_lines() {
        let line: LineString = vec![(10., 0.), (0., 0.)].into();
        let above = LinePlacementFlags {
            above_line: true,
            ..Default::default()
        };

        // relative to the line, "above" a leftward line is below it on the map
        let part = line_part(line.clone(), 4., layer(Arrangement::Line).with_line_flags(above));
        let positions = generate(&part, true);
        assert!(!positions.is_empty());
        for position in &positions {
            assert!(position.bounding_rect().maxy <= 1e-9);
        }

        let map_above = LinePlacementFlags {
            map_orientation: true,
            ..above
        };
        let part = line_part(line, 4., layer(Arrangement::Line).with_line_flags(map_above));
        let positions = generate(&part, true);
        assert_eq!(positions.len(), 8);
        for position in &positions {
            assert_relative_eq!(position.alpha(), 0., epsilon = 1e-9);
            assert_relative_eq!(position.y(), 0., epsilon = 1e-9);
            assert!(position.bounding_rect().miny >= -1e-9);
            assert!(position.bounding_rect().maxy > 0.5);
            assert_eq!(position.quadrant(), Quadrant::Over);
        }
        // the map-up side takes the unbiased cost
        let cheapest = positions
            .iter()
            .min_by(|a, b| a.cost().total_cmp(&b.cost()))
            .unwrap();
        assert_relative_eq!(cheapest.cost(), 0.0001, epsilon = 1e-12);
    }

    #[test]
    fn hard_break_splits_runs() {
        let part = line_part(bent_line(), 4., layer(Arrangement::Line));
        let positions = generate(&part, true);
        assert!(!positions.is_empty());
        // every window lies on one leg, horizontal or vertical
        for position in positions.iter().take(8) {
            let alpha = position.alpha();
            assert!(
                alpha.abs() < 1e-9 || (alpha - FRAC_PI_2).abs() < 1e-9,
                "unexpected angle {alpha}"
            );
        }
    }

    #[test]
    fn short_line_is_centered() {
        let part = line_part(straight_line(2.), 4., layer(Arrangement::Horizontal));
        let positions = generate(&part, false);
        assert_eq!(positions.len(), 1);
        // window starts one unit before the line and is centered on its start
        assert_relative_eq!(positions[0].x(), -3.);
        assert_relative_eq!(positions[0].y(), -0.5);
    }

    #[test]
    fn overrun_limits_short_lines() {
        let part = line_part(straight_line(2.), 4., layer(Arrangement::Line));
        // without any overrun distance the label may not hang past the line
        assert!(generate(&part, true).is_empty());
    }
}
