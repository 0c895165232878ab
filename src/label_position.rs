//! Scored label candidates.

use std::f64::consts::{FRAC_PI_2, PI};

use geo::{Coord, Polygon};
use rstar::{RTreeObject, AABB};

use crate::feature::PartId;
use crate::geometry::functions::{label_corners, label_polygon, normalized_angle};
use crate::geometry::BoundingRect;

/// Position of a candidate relative to the anchor it was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quadrant {
    AboveLeft,
    Above,
    AboveRight,
    Left,
    #[default]
    Over,
    Right,
    BelowLeft,
    Below,
    BelowRight,
}

/// Footprint of one character of a curved label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterPart {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub alpha: f64,
    /// Index of the character in the label text.
    pub char_index: usize,
}

impl CharacterPart {
    pub fn corners(&self) -> [Coord; 4] {
        label_corners(self.x, self.y, self.width, self.height, self.alpha)
    }

    pub fn polygon(&self) -> Polygon {
        label_polygon(self.x, self.y, self.width, self.height, self.alpha)
    }
}

/// One scored candidate position for a feature part's label.
///
/// The anchor `(x, y)` is the bottom-left corner of the label before rotation by `alpha`.
/// Curved labels store their first character in the head fields and the remaining characters
/// in [`LabelPosition::next_parts`]; every part then describes a single character's footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPosition {
    id: usize,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    alpha: f64,
    cost: f64,
    part: PartId,
    reversed: bool,
    quadrant: Quadrant,
    upside_down_char_count: usize,
    head_char_index: usize,
    next_parts: Vec<CharacterPart>,
}

impl LabelPosition {
    /// Create a candidate. `alpha` is normalized into `[0, 2π)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        alpha: f64,
        cost: f64,
        part: PartId,
        reversed: bool,
        quadrant: Quadrant,
    ) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
            alpha: normalized_angle(alpha),
            cost,
            part,
            reversed,
            quadrant,
            upside_down_char_count: 0,
            head_char_index: 0,
            next_parts: Vec::new(),
        }
    }

    /// Turn a label that would read upside-down by 180°, keeping its footprint.
    ///
    /// Applies when the angle lies in `(π/2, 3π/2]`: the anchor moves to the opposite corner
    /// and the reversed flag toggles.
    pub fn upright(mut self) -> Self {
        if self.alpha > FRAC_PI_2 && self.alpha <= 3.0 * FRAC_PI_2 {
            let opposite = self.corners()[2];
            self.x = opposite.x;
            self.y = opposite.y;
            self.alpha -= PI;
            self.reversed = !self.reversed;
        }
        self
    }

    pub(crate) fn with_characters(
        mut self,
        head_char_index: usize,
        next_parts: Vec<CharacterPart>,
        upside_down_char_count: usize,
    ) -> Self {
        self.head_char_index = head_char_index;
        self.next_parts = next_parts;
        self.upside_down_char_count = upside_down_char_count;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    pub fn upside_down_char_count(&self) -> usize {
        self.upside_down_char_count
    }

    /// Characters following the first one, for curved labels.
    pub fn next_parts(&self) -> &[CharacterPart] {
        &self.next_parts
    }

    pub fn is_curved(&self) -> bool {
        !self.next_parts.is_empty()
    }

    /// The head footprint followed by every character part.
    pub fn parts(&self) -> impl Iterator<Item = CharacterPart> + '_ {
        std::iter::once(CharacterPart {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            alpha: self.alpha,
            char_index: self.head_char_index,
        })
        .chain(self.next_parts.iter().copied())
    }

    pub fn part_polygons(&self) -> impl Iterator<Item = Polygon> + '_ {
        self.parts().map(|part| part.polygon())
    }

    pub fn corners(&self) -> [Coord; 4] {
        label_corners(self.x, self.y, self.width, self.height, self.alpha)
    }

    pub fn polygon(&self) -> Polygon {
        label_polygon(self.x, self.y, self.width, self.height, self.alpha)
    }

    /// Axis-aligned box enclosing every part.
    pub fn bounding_rect(&self) -> BoundingRect {
        let mut rect = BoundingRect::new();
        for part in self.parts() {
            for corner in part.corners() {
                rect.update(corner);
            }
        }
        rect
    }

    /// Copy of this candidate with every part moved by `(dx, dy)`.
    pub fn offset_by(&self, dx: f64, dy: f64) -> Self {
        let mut moved = self.clone();
        moved.x += dx;
        moved.y += dy;
        for part in moved.next_parts.iter_mut() {
            part.x += dx;
            part.y += dy;
        }
        moved
    }
}

impl RTreeObject for LabelPosition {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounding_rect().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candidate(alpha: f64) -> LabelPosition {
        LabelPosition::new(0, 0., 0., 4., 1., alpha, 0.001, PartId::default(), false, Quadrant::Over)
    }

    #[test]
    fn angle_is_normalized() {
        assert_relative_eq!(candidate(-FRAC_PI_2).alpha(), 3.0 * FRAC_PI_2);
        assert_relative_eq!(candidate(2.0 * PI).alpha(), 0.);
    }

    #[test]
    fn upright_flips_upside_down_labels() {
        let flipped = candidate(PI).upright();
        assert_relative_eq!(flipped.alpha(), 0.);
        assert!(flipped.is_reversed());
        assert_relative_eq!(flipped.x(), -4., epsilon = 1e-12);
        assert_relative_eq!(flipped.y(), -1., epsilon = 1e-12);

        // same footprint
        let before = candidate(PI).bounding_rect();
        let after = flipped.bounding_rect();
        assert_relative_eq!(before.minx, after.minx, epsilon = 1e-12);
        assert_relative_eq!(before.maxy, after.maxy, epsilon = 1e-12);

        let readable = candidate(0.3).upright();
        assert_relative_eq!(readable.alpha(), 0.3);
        assert!(!readable.is_reversed());
    }

    #[test]
    fn offset_moves_every_part() {
        let curved = candidate(0.).with_characters(
            0,
            vec![CharacterPart {
                x: 1.,
                y: 0.,
                width: 1.,
                height: 1.,
                alpha: 0.,
                char_index: 1,
            }],
            0,
        );
        let moved = curved.offset_by(2., 3.);
        assert_eq!(moved.parts().count(), 2);
        assert_relative_eq!(moved.x(), 2.);
        assert_relative_eq!(moved.next_parts()[0].x, 3.);
        assert_relative_eq!(moved.next_parts()[0].y, 3.);

        let envelope = moved.envelope();
        assert_eq!(envelope.lower(), [2., 3.]);
        assert_eq!(envelope.upper(), [6., 4.]);
    }
}
