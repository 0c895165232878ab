//! Features to label and the single-geometry parts candidates are generated for.

mod label_feature;
mod merge;
mod part;

pub use label_feature::{FeatureId, LabelFeature, LabelInfo};
pub use part::{FeaturePart, GeometryKind, PartId};

pub(crate) use part::geometry_type_name;
