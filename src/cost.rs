//! Cost adjustments shared by every placement strategy.

use geo::{Area, EuclideanLength, Rect};

use crate::feature::{FeaturePart, GeometryKind};
use crate::label_position::LabelPosition;

/// Penalize every candidate of a line or polygon that is small relative to the map extent.
///
/// Lines shorter than a quarter of the extent's larger side, and polygons smaller than a
/// sixteenth of its area, get up to `0.01` added to each candidate, growing linearly as the
/// feature shrinks. Points are never penalized.
pub fn add_size_penalty(part: &FeaturePart, positions: &mut [LabelPosition], extent: &Rect) {
    let size_cost = match part.kind() {
        GeometryKind::Point => return,
        GeometryKind::Line => {
            let threshold = extent.width().max(extent.height()) / 4.0;
            let length = part.shape().to_line_string().euclidean_length();
            if length >= threshold {
                return;
            }
            1.0 - length / threshold
        }
        GeometryKind::Polygon => {
            let threshold = extent.width() * extent.height() / 16.0;
            let area = part.polygon().unsigned_area();
            if area >= threshold {
                return;
            }
            1.0 - area / threshold
        }
    };

    for position in positions {
        position.set_cost(position.cost() + size_cost / 100.0);
    }
}

/// Sort by ascending cost. Candidates with equal costs keep their creation order.
pub fn sort_by_cost(positions: &mut [LabelPosition]) {
    positions.sort_by(|a, b| a.cost().total_cmp(&b.cost()));
}
