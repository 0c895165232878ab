//! The point-set geometry model used by all placement strategies.

mod arena;
mod bounding_rect;
mod chull_box;
pub mod functions;
mod point_set;
pub mod split;

pub mod boundary;

pub use arena::{ShapeArena, ShapeId};
pub use boundary::LabelingBoundary;
pub use bounding_rect::BoundingRect;
pub use chull_box::CHullBox;
pub use point_set::{PathDistances, PointSet};
