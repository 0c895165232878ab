//! Curved labels laid out character by character along a path.

use std::f64::consts::{FRAC_PI_2, PI};

use geo::Coord;
use itertools::Itertools;

use crate::feature::{FeaturePart, LabelInfo};
use crate::geometry::functions::{
    contains_candidate, dist_euc2d, double_near, line_circle_intersection, normalized_angle,
};
use crate::geometry::PointSet;
use crate::label_position::{CharacterPart, LabelPosition, Quadrant};
use crate::log::debug;
use crate::placement::PlacementContext;

const CHARACTER_COST: f64 = 0.0001;

/// Direction characters are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Chosen from the label's net horizontal run on first use.
    Auto,
    Forward,
    Backward,
}

impl Orientation {
    fn flipped(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Backward,
            Orientation::Backward => Orientation::Forward,
            Orientation::Auto => Orientation::Auto,
        }
    }
}

/// Layout state shared between a first attempt at an offset and its retry.
#[derive(Debug, Clone, Copy)]
struct Layout {
    orientation: Orientation,
    reversed: bool,
    flip: bool,
}

/// A path with the length of the segment ending at each vertex (0 for the first vertex).
struct Path<'a> {
    coords: &'a [Coord],
    segment_lengths: Vec<f64>,
}

impl<'a> Path<'a> {
    fn new(coords: &'a [Coord]) -> Self {
        let segment_lengths = std::iter::once(0.0)
            .chain(
                coords
                    .iter()
                    .tuple_windows()
                    .map(|(a, b)| dist_euc2d(*a, *b)),
            )
            .collect();
        Self {
            coords,
            segment_lengths,
        }
    }

    fn total(&self) -> f64 {
        self.segment_lengths.iter().sum()
    }

    /// Start and end of the next character of `char_width`, starting `along` units into the
    /// segment ending at vertex `index`. Both cursors advance past the character.
    fn next_char_position(
        &self,
        char_width: f64,
        index: &mut usize,
        along: &mut f64,
    ) -> Option<(Coord, Coord)> {
        let segment_length = self.segment_lengths[*index];
        if double_near(segment_length, 0.0) {
            return None;
        }

        let mut segment_start = self.coords[*index - 1];
        let mut segment_end = self.coords[*index];
        let dx = segment_end.x - segment_start.x;
        let dy = segment_end.y - segment_start.y;
        let start = Coord {
            x: segment_start.x + dx * *along / segment_length,
            y: segment_start.y + dy * *along / segment_length,
        };

        let end = if segment_length - *along >= char_width {
            *along += char_width;
            Coord {
                x: segment_start.x + dx * *along / segment_length,
                y: segment_start.y + dy * *along / segment_length,
            }
        } else {
            // the character spans one or more vertices
            loop {
                segment_start = segment_end;
                *index += 1;
                if *index >= self.coords.len() {
                    return None;
                }
                segment_end = self.coords[*index];
                if dist_euc2d(start, segment_end) >= char_width {
                    break;
                }
            }
            let end = line_circle_intersection(start, char_width, segment_start, segment_end)?;
            *along = dist_euc2d(segment_start, end);
            end
        };
        Some((start, end))
    }
}

/// Curved candidates along `line`, one character footprint per part.
///
/// Needs the feature's [`LabelInfo`]; features without character metrics get no candidates.
/// `allow_overrun` extends open lines at both ends by the feature's overrun distance when the
/// label is longer than the line.
pub fn curved_along_line(
    part: &FeaturePart,
    line: &PointSet,
    allow_overrun: bool,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    let feature = part.feature();
    let Some(info) = feature.label_info.as_ref() else {
        return vec![];
    };
    let char_count = info.char_count();
    if char_count == 0 || line.len() < 2 {
        return vec![];
    }

    let allow_overrun = allow_overrun && part.total_repeats() <= 1;
    let total_char_width = info.total_width();
    let overrun = feature.overrun_distance.min(total_char_width * 0.95);
    let line_length = line.length();
    if total_char_width > line_length
        && (!allow_overrun || line_length < total_char_width - 2.0 * overrun)
    {
        return vec![];
    }

    let extended;
    let line = if allow_overrun && overrun > 0.0 {
        let mut copy = line.clone();
        copy.extend_line_by_distance(overrun, overrun, feature.overrun_smoothing_distance);
        extended = copy;
        &extended
    } else {
        line
    };

    let path = Path::new(line.coords());
    let total = path.total();
    if double_near(total, 0.0) {
        return vec![];
    }

    let flags = part.layer().line_flags.effective();
    let label_height = info.label_height;
    let delta = (label_height / 6.0).max(total / ctx.settings.candidates_line as f64);
    let upright = part.show_upright_labels();

    let mut positions = Vec::new();
    let mut start = 0.0;
    while start < total {
        if ctx.cancel.is_cancelled() {
            debug!(part = part.id().0, "curved placement cancelled");
            break;
        }

        let mut layout = Layout {
            orientation: if flags.map_orientation {
                Orientation::Auto
            } else {
                Orientation::Forward
            },
            reversed: false,
            flip: false,
        };
        let mut placement = placement_at_offset(part, info, &path, start, &mut layout);
        if let Some(first) = &placement {
            // mostly upside down: retry the other way round
            if first.upside_down_char_count() as f64 >= char_count as f64 / 2.0
                && upright
                && !layout.flip
            {
                layout.orientation = layout.orientation.flipped();
                placement = placement_at_offset(part, info, &path, start, &mut layout);
            }
        }

        if let Some(mut placement) = placement {
            let mut angle_diff = 0.0;
            let mut sin_sum = 0.0;
            let mut cos_sum = 0.0;
            let mut last_alpha = 0.0;
            for (i, character) in placement.parts().enumerate() {
                if i > 0 {
                    let mut diff = (character.alpha - last_alpha).abs();
                    if diff > 2.0 * PI {
                        diff -= 2.0 * PI;
                    }
                    angle_diff += diff.min(2.0 * PI - diff);
                }
                let (sin, cos) = character.alpha.sin_cos();
                sin_sum += sin;
                cos_sum += cos;
                last_alpha = character.alpha;
            }

            let n = char_count as f64;
            let average_diff = if char_count > 1 {
                angle_diff / (n - 1.0)
            } else {
                0.0
            };
            let mut cost = (average_diff / 100.0).max(CHARACTER_COST);
            let label_center = start + part.label_width() / 2.0;
            cost += (total / 2.0 - label_center).abs() / total / 100.0;
            placement.set_cost(cost);

            let average_angle = (sin_sum / n).atan2(cos_sum / n);
            let local_reversed = layout.reversed != layout.flip;
            let distance = feature.distance_label;
            let (sin_normal, cos_normal) = (average_angle + FRAC_PI_2).sin_cos();

            let above = (!local_reversed && flags.above_line) || (local_reversed && flags.below_line);
            let below = (!local_reversed && flags.below_line) || (local_reversed && flags.above_line);
            let sides = [
                (above, distance + label_height / 2.0, 0.0),
                (flags.on_line, 0.0, 0.002),
                (below, -label_height / 2.0 - distance, 0.001),
            ];
            for (_, offset, bias) in sides.into_iter().filter(|(enabled, _, _)| *enabled) {
                let mut shifted = placement.offset_by(offset * cos_normal, offset * sin_normal);
                shifted.set_cost(shifted.cost() + bias);
                if let Some(zone) = &feature.permissible_zone {
                    let inside = shifted.parts().all(|c| {
                        contains_candidate(zone, c.x, c.y, c.width, c.height, c.alpha)
                    });
                    if !inside {
                        continue;
                    }
                }
                positions.push(shifted);
            }
        }

        start += delta;
    }
    positions
}

/// Lay out every character starting `offset` units along the path.
///
/// Returns `None` when the label runs off the path or a turn between consecutive characters
/// exceeds the configured curvature limits.
fn placement_at_offset(
    part: &FeaturePart,
    info: &LabelInfo,
    path: &Path,
    offset: f64,
    layout: &mut Layout,
) -> Option<LabelPosition> {
    let n = path.coords.len();
    let mut along = offset;
    let mut index = 1;
    while index < n && along > path.segment_lengths[index] {
        along -= path.segment_lengths[index];
        index += 1;
    }
    if index >= n || double_near(path.segment_lengths[index], 0.0) {
        return None;
    }

    if layout.orientation == Orientation::Auto {
        // dry run to find which way the label reads
        let mut probe_index = index;
        let mut probe_along = along;
        let mut label_start = None;
        let mut label_end = Coord { x: 0., y: 0. };
        for &char_width in &info.char_widths {
            let (start, end) = path.next_char_position(char_width, &mut probe_index, &mut probe_along)?;
            label_start.get_or_insert(start);
            label_end = end;
        }
        let label_start = label_start?;
        let line_angle = (label_start.y - label_end.y)
            .atan2(label_end.x - label_start.x)
            .to_degrees();
        let right_to_left = !(-90.0..=90.0).contains(&line_angle);
        layout.reversed = right_to_left;
        layout.orientation = if right_to_left {
            Orientation::Backward
        } else {
            Orientation::Forward
        };
    }

    if !part.show_upright_labels() && layout.orientation == Orientation::Backward {
        layout.flip = true;
        layout.reversed = !layout.reversed;
        layout.orientation = Orientation::Forward;
    }
    let backward = layout.orientation == Orientation::Backward;

    let segment_start = path.coords[index - 1];
    let segment_end = path.coords[index];
    let mut angle = (segment_start.y - segment_end.y).atan2(segment_end.x - segment_start.x);

    let char_count = info.char_count();
    let max_inside = info.max_char_angle_inside.to_radians();
    let max_outside = info.max_char_angle_outside.to_radians();
    let mut characters = Vec::with_capacity(char_count);
    let mut upside_down = 0;
    for i in 0..char_count {
        let last_angle = angle;
        let char_index = if backward { char_count - i - 1 } else { i };
        let char_width = info.char_widths[char_index];
        if double_near(char_width, 0.0) {
            continue;
        }

        let (mut start, end) = path.next_char_position(char_width, &mut index, &mut along)?;
        angle = (start.y - end.y).atan2(end.x - start.x);

        let mut turn = last_angle - angle;
        while turn > PI {
            turn -= 2.0 * PI;
        }
        while turn < -PI {
            turn += 2.0 * PI;
        }
        if (max_inside > 0.0 && turn > 0.0 && turn > max_inside)
            || (max_outside < 0.0 && turn < 0.0 && turn < max_outside)
        {
            return None;
        }

        // move down from the baseline so the character sits across the path
        let mut shift = 0.9 * info.label_height / 2.0;
        if backward {
            shift = -shift;
            layout.flip = true;
        }
        let (sin_normal, cos_normal) = (angle + FRAC_PI_2).sin_cos();
        start.x += shift * cos_normal;
        start.y -= shift * sin_normal;

        let mut render_angle = angle;
        let mut anchor = start;
        if backward {
            anchor.x += char_width * angle.cos();
            anchor.y -= char_width * angle.sin();
            render_angle += PI;
        }

        characters.push(CharacterPart {
            x: anchor.x,
            y: anchor.y,
            width: char_width,
            height: info.label_height,
            alpha: normalized_angle(-render_angle),
            char_index,
        });

        let render_angle = normalized_angle(render_angle);
        if render_angle > FRAC_PI_2 && render_angle < 1.5 * PI {
            upside_down += 1;
        }
    }

    let mut characters = characters.into_iter();
    let head = characters.next()?;
    Some(
        LabelPosition::new(
            0,
            head.x,
            head.y,
            head.width,
            head.height,
            head.alpha,
            CHARACTER_COST,
            part.id(),
            false,
            Quadrant::Over,
        )
        .with_characters(head.char_index, characters.collect(), upside_down),
    )
}
