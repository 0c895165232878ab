//! Engine- and layer-level placement configuration.
//!
//! Every type here is (de)serializable with serde and fills missing fields from its
//! [`Default`], so partial JSON documents are accepted.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings shared by every layer of a labeling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of candidates generated around a point.
    pub candidates_point: usize,

    /// Candidate-count hint for lines, used to derive the sliding step.
    pub candidates_line: usize,

    /// Keep candidates that only intersect the labeling boundary.
    pub show_partial: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            candidates_point: 16,
            candidates_line: 8,
            show_partial: false,
        }
    }
}

impl EngineSettings {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Placement mode configured for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Arrangement {
    /// Candidates spread radially around a point (or polygon centroid).
    #[default]
    AroundPoint,
    /// A single candidate over a point (or polygon centroid).
    OverPoint,
    /// Straight text rotated to follow a line or polygon perimeter.
    Line,
    /// Curved text following a line.
    Curved,
    /// Unrotated text along a line, or inside a polygon.
    Horizontal,
    /// Grid placement inside a polygon with unconstrained rotation.
    Free,
    /// Caller-ordered compass positions around a point.
    OrderedPositionsAroundPoint,
    /// Curved text following a polygon perimeter.
    PerimeterCurved,
}

impl Arrangement {
    /// Whether line features on this layer use curved text.
    pub fn is_curved(&self) -> bool {
        matches!(self, Arrangement::Curved | Arrangement::PerimeterCurved)
    }
}

/// Which sides of a line candidates may be placed on.
///
/// No flag set at all is treated as "on line".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePlacementFlags {
    pub on_line: bool,
    pub above_line: bool,
    pub below_line: bool,
    /// Interpret above/below relative to the map rather than to the line direction.
    pub map_orientation: bool,
}

impl LinePlacementFlags {
    pub const ON_LINE: Self = Self {
        on_line: true,
        above_line: false,
        below_line: false,
        map_orientation: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.on_line || self.above_line || self.below_line || self.map_orientation)
    }

    /// The flags actually used for placement.
    pub fn effective(&self) -> Self {
        if self.is_empty() {
            Self::ON_LINE
        } else {
            *self
        }
    }
}

/// Policy for labels that would render upside-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpsideDownLabels {
    /// Always turn labels upright.
    #[default]
    Upright,
    /// Upright unless the rotation is data defined.
    ShowDefined,
    /// Never turn labels.
    ShowAll,
}

/// Reference used for offsets of ordered point positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffsetType {
    #[default]
    FromPoint,
    /// Offsets are measured from the edges of the point's marker symbol.
    FromSymbolBounds,
}

/// Named compass positions for [`Arrangement::OrderedPositionsAroundPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredefinedPointPosition {
    TopLeft,
    TopSlightlyLeft,
    TopMiddle,
    TopSlightlyRight,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomSlightlyLeft,
    BottomMiddle,
    BottomSlightlyRight,
    BottomRight,
}

impl PredefinedPointPosition {
    /// Default priority order used when a feature supplies none.
    pub const DEFAULT_ORDER: [PredefinedPointPosition; 8] = [
        PredefinedPointPosition::TopRight,
        PredefinedPointPosition::TopLeft,
        PredefinedPointPosition::BottomRight,
        PredefinedPointPosition::BottomLeft,
        PredefinedPointPosition::MiddleRight,
        PredefinedPointPosition::MiddleLeft,
        PredefinedPointPosition::TopSlightlyRight,
        PredefinedPointPosition::BottomSlightlyRight,
    ];
}

/// Empty space between the rendered text and its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Per-layer placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub name: String,
    pub arrangement: Arrangement,
    pub line_flags: LinePlacementFlags,
    pub upside_down: UpsideDownLabels,

    /// Polygon centroids used as point anchors must fall inside the polygon.
    pub centroid_inside: bool,

    /// Merge touching line parts sharing a label text before placement.
    pub merge_connected_lines: bool,

    /// Priority for features that do not set their own, in `[0, 1]`.
    pub priority: f64,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            arrangement: Arrangement::default(),
            line_flags: LinePlacementFlags::default(),
            upside_down: UpsideDownLabels::default(),
            centroid_inside: false,
            merge_connected_lines: false,
            priority: 0.5,
        }
    }
}

impl LayerSettings {
    pub fn new(name: impl Into<String>, arrangement: Arrangement) -> Self {
        Self {
            name: name.into(),
            arrangement,
            ..Default::default()
        }
    }

    pub fn with_line_flags(self, line_flags: LinePlacementFlags) -> Self {
        Self { line_flags, ..self }
    }

    pub fn with_upside_down(self, upside_down: UpsideDownLabels) -> Self {
        Self {
            upside_down,
            ..self
        }
    }

    pub fn with_centroid_inside(self, centroid_inside: bool) -> Self {
        Self {
            centroid_inside,
            ..self
        }
    }

    pub fn with_merge_connected_lines(self, merge_connected_lines: bool) -> Self {
        Self {
            merge_connected_lines,
            ..self
        }
    }

    pub fn with_priority(self, priority: f64) -> Self {
        Self { priority, ..self }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
