//! Defines [`LabelError`], representing all errors returned by this crate.

use thiserror::Error;

/// Enum with all errors in this crate.
///
/// Candidate generation itself never fails: a feature that cannot be placed contributes no
/// candidates. Errors are only raised while configuring layers and registering features.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LabelError {
    /// A settings document could not be parsed.
    #[error(transparent)]
    Config(#[from] serde_json::Error),

    /// Incorrect geometry type for operation
    #[error("Incorrect geometry type for operation: {0}")]
    IncorrectGeometryType(String),

    /// Geometry that cannot be labeled, e.g. without any coordinates
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A feature was registered against a layer the engine does not know about.
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// A layer with the same name is already registered.
    #[error("Duplicate layer: {0}")]
    DuplicateLayer(String),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, LabelError>;
