//! Candidate generation and cost scoring for automated map label placement.
//!
//! Features are registered on an [`Engine`] layer, decomposed into single-geometry
//! [`FeaturePart`]s, and each part gets a list of scored [`LabelPosition`] candidates from the
//! placement strategy its geometry and layer arrangement select. Candidates are indexed in a
//! shared R-tree so an optimizer can find conflicts between them.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub use cancel::CancellationToken;
pub use engine::{Engine, Layer, Problem};
pub use error::{LabelError, Result};
pub use feature::{FeatureId, FeaturePart, GeometryKind, LabelFeature, LabelInfo, PartId};
pub use geometry::LabelingBoundary;
pub use index::{CandidateIndex, IndexedCandidate};
pub use label_position::{CharacterPart, LabelPosition, Quadrant};
pub use settings::{
    Arrangement, EngineSettings, LayerSettings, LinePlacementFlags, Margins, OffsetType,
    PredefinedPointPosition, UpsideDownLabels,
};

pub mod cancel;
pub mod cost;
pub mod engine;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod index;
pub mod label_position;
mod log;
pub mod placement;
pub mod settings;
#[cfg(test)]
pub(crate) mod test;
