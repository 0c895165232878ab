//! Candidates around a single anchor point.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4, PI};

use geo::Coord;

use crate::feature::FeaturePart;
use crate::geometry::functions::double_near;
use crate::label_position::{LabelPosition, Quadrant};
use crate::placement::{candidate, in_permissible_zone, PlacementContext};
use crate::settings::{Arrangement, OffsetType, PredefinedPointPosition};

const BASE_COST: f64 = 0.0001;
/// Cost added for each ordered position after the first accepted one.
const ORDERED_POSITION_STEP: f64 = 0.001;
/// Spread of the around-point costs between the cheapest and the most expensive candidate.
const AROUND_COST_RANGE: f64 = 0.0020;

/// A single candidate centered on `anchor`, moved by the quadrant offset and then either by the
/// label distance (around-point layers) or by the position offset.
pub fn over_point(part: &FeaturePart, anchor: Coord, angle: f64) -> Vec<LabelPosition> {
    let feature = part.feature();
    let width = part.label_width();
    let height = part.label_height();
    let quad = feature.quad_offset;

    let mut xdiff = -width / 2.0;
    let mut ydiff = -height / 2.0;
    if !double_near(quad.x, 0.0) {
        xdiff += width / 2.0 * quad.x;
    }
    if !double_near(quad.y, 0.0) {
        ydiff += height / 2.0 * quad.y;
    }

    if !feature.has_fixed_position() && !double_near(angle, 0.0) {
        let (sin, cos) = angle.sin_cos();
        (xdiff, ydiff) = (xdiff * cos - ydiff * sin, xdiff * sin + ydiff * cos);
    }

    if part.layer().arrangement == Arrangement::AroundPoint {
        let distance = feature.distance_label;
        if double_near(quad.x, 0.0) {
            ydiff += quad.y * distance;
        } else if double_near(quad.y, 0.0) {
            xdiff += quad.x * distance;
        } else {
            xdiff += quad.x * FRAC_1_SQRT_2 * distance;
            ydiff += quad.y * FRAC_1_SQRT_2 * distance;
        }
    } else {
        xdiff += feature.position_offset.x;
        ydiff += feature.position_offset.y;
    }

    let x = anchor.x + xdiff;
    let y = anchor.y + ydiff;
    if !in_permissible_zone(part, x, y, angle) {
        return vec![];
    }

    vec![candidate(
        part,
        x,
        y,
        angle,
        BASE_COST,
        false,
        part.quadrant_from_offset(),
    )]
}

/// Candidates at the feature's predefined compass positions, in priority order.
///
/// Each accepted position costs a little more than the previous accepted one.
pub fn ordered_positions(part: &FeaturePart, anchor: Coord, angle: f64) -> Vec<LabelPosition> {
    let feature = part.feature();
    let width = part.label_width();
    let height = part.label_height();
    let distance = feature.distance_label;
    let margin = feature.visual_margin;

    let (symbol_dx, symbol_dy) = match feature.offset_type {
        OffsetType::FromSymbolBounds => (feature.symbol_width / 2.0, feature.symbol_height / 2.0),
        OffsetType::FromPoint => (0.0, 0.0),
    };

    let left = -width + margin.right - symbol_dx;
    let right = -margin.left + symbol_dx;
    let top = -margin.bottom + symbol_dy;
    let bottom = -height + margin.top - symbol_dy;

    let mut cost = BASE_COST;
    let mut positions = Vec::new();
    for position in &feature.predefined_positions {
        use PredefinedPointPosition::*;
        let (quadrant, alpha, dx, dy) = match position {
            TopLeft => (Quadrant::AboveLeft, 3.0 * FRAC_PI_4, left, top),
            // right quadrant, so the text is left-aligned
            TopSlightlyLeft => (
                Quadrant::AboveRight,
                FRAC_PI_2,
                -width / 4.0 - margin.left,
                top,
            ),
            TopMiddle => (Quadrant::Above, FRAC_PI_2, -width / 2.0, top),
            TopSlightlyRight => (
                Quadrant::AboveLeft,
                FRAC_PI_2,
                -width * 3.0 / 4.0 + margin.right,
                top,
            ),
            TopRight => (Quadrant::AboveRight, FRAC_PI_4, right, top),
            MiddleLeft => (Quadrant::Left, PI, left, -height / 2.0),
            MiddleRight => (Quadrant::Right, 0.0, right, -height / 2.0),
            BottomLeft => (Quadrant::BelowLeft, 5.0 * FRAC_PI_4, left, bottom),
            BottomSlightlyLeft => (
                Quadrant::BelowRight,
                3.0 * FRAC_PI_2,
                -width / 4.0 - margin.left,
                bottom,
            ),
            BottomMiddle => (Quadrant::Below, 3.0 * FRAC_PI_2, -width / 2.0, bottom),
            BottomSlightlyRight => (
                Quadrant::BelowLeft,
                3.0 * FRAC_PI_2,
                -width * 3.0 / 4.0 + margin.right,
                bottom,
            ),
            BottomRight => (Quadrant::BelowRight, 7.0 * FRAC_PI_4, right, bottom),
        };

        // bearing and distance give the reference point the offsets apply to
        let x = alpha.cos() * distance + anchor.x + dx;
        let y = alpha.sin() * distance + anchor.y + dy;

        if in_permissible_zone(part, x, y, angle) {
            positions.push(candidate(part, x, y, angle, cost, false, quadrant));
            cost += ORDERED_POSITION_STEP;
        }
    }
    positions
}

/// `count` candidates evenly spread by angle around `anchor`, starting at π/4.
///
/// Costs bounce between low and high so the candidates next to the preferred upper-right
/// position are the cheapest after it. The bounce advances for every angle, including those
/// whose candidate falls outside the permissible zone.
pub fn around_point(
    part: &FeaturePart,
    anchor: Coord,
    angle: f64,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    let width = part.label_width();
    let height = part.label_height();
    let distance = part.distance_label();
    let count = ctx.settings.candidates_point;
    if count == 0 {
        return vec![];
    }

    let a360 = 2.0 * PI;
    let a270 = 3.0 * FRAC_PI_2;
    let max_gamma = FRAC_PI_2 / 3.0;
    let (gamma1, gamma2) = if distance > 0.0 {
        (
            (height / 2.0).atan2(distance + width / 2.0).min(max_gamma),
            (width / 2.0).atan2(distance + height / 2.0).min(max_gamma),
        )
    } else {
        (max_gamma, max_gamma)
    };

    let increment = a360 / count as f64;
    let mut icost = 0_i64;
    let mut inc = 2_i64;
    let n = count as i64;

    let mut positions = Vec::with_capacity(count);
    let mut angle_to_candidate = FRAC_PI_4;
    for _ in 0..count {
        if angle_to_candidate > a360 {
            angle_to_candidate -= a360;
        }
        let a = angle_to_candidate;

        let mut x = anchor.x;
        let mut y = anchor.y;
        let quadrant = if a < gamma1 || a > a360 - gamma1 {
            x += distance;
            let mut iota = a + gamma1;
            if iota > a360 - gamma1 {
                iota -= a360;
            }
            y += -height + height * iota / (2.0 * gamma1);
            Quadrant::Right
        } else if a < FRAC_PI_2 - gamma2 {
            x += distance * a.cos();
            y += distance * a.sin();
            Quadrant::AboveRight
        } else if a < FRAC_PI_2 + gamma2 {
            x += -width * (a - FRAC_PI_2 + gamma2) / (2.0 * gamma2);
            y += distance;
            Quadrant::Above
        } else if a < PI - gamma1 {
            x += distance * a.cos() - width;
            y += distance * a.sin();
            Quadrant::AboveLeft
        } else if a < PI + gamma1 {
            x += -distance - width;
            y += -(a - PI + gamma1) * height / (2.0 * gamma1);
            Quadrant::Left
        } else if a < a270 - gamma2 {
            x += distance * a.cos() - width;
            y += distance * a.sin() - height;
            Quadrant::BelowLeft
        } else if a < a270 + gamma2 {
            y += -distance - height;
            x += -width + (a - a270 + gamma2) * width / (2.0 * gamma2);
            Quadrant::Below
        } else {
            x += distance * a.cos();
            y += distance * a.sin() - height;
            Quadrant::BelowRight
        };

        let cost = if count == 1 {
            BASE_COST
        } else {
            BASE_COST + AROUND_COST_RANGE * icost as f64 / (n - 1) as f64
        };

        if in_permissible_zone(part, x, y, angle) {
            positions.push(candidate(part, x, y, angle, cost, false, quadrant));
        }

        icost += inc;
        if icost == n {
            icost = n - 1;
            inc = -2;
        } else if icost > n {
            icost = n - 2;
            inc = -2;
        }

        angle_to_candidate += increment;
    }
    positions
}
