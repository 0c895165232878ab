use geo::{point, Geometry};

use crate::feature::{FeatureId, LabelFeature};

/// Point feature with a 2 x 1 label.
pub(crate) fn point_feature(x: f64, y: f64) -> LabelFeature {
    LabelFeature::new(FeatureId(1), Geometry::Point(point!(x: x, y: y)), 2., 1.)
}
