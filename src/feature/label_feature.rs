use geo::{coord, Coord, Geometry, MultiPolygon};

use crate::settings::{Margins, OffsetType, PredefinedPointPosition};

/// Identifier of a feature within its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FeatureId(pub u64);

/// Per-character metrics for curved labels.
///
/// Produced by the text shaping pipeline; placement only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelInfo {
    pub char_widths: Vec<f64>,
    pub label_height: f64,
    /// Largest permitted angle change between two characters on the inside of a curve, in
    /// degrees. Zero disables the check.
    pub max_char_angle_inside: f64,
    /// Largest permitted angle change on the outside of a curve, in degrees (negative).
    /// Zero disables the check.
    pub max_char_angle_outside: f64,
}

impl LabelInfo {
    pub fn new(char_widths: Vec<f64>, label_height: f64) -> Self {
        Self {
            char_widths,
            label_height,
            max_char_angle_inside: 0.,
            max_char_angle_outside: 0.,
        }
    }

    pub fn with_max_char_angles(self, inside: f64, outside: f64) -> Self {
        Self {
            max_char_angle_inside: inside,
            max_char_angle_outside: outside,
            ..self
        }
    }

    pub fn char_count(&self) -> usize {
        self.char_widths.len()
    }

    pub fn total_width(&self) -> f64 {
        self.char_widths.iter().sum()
    }
}

/// A feature to label, with the footprint of its label and every placement constraint
/// the caller attached to it.
///
/// Shared between all parts the feature is decomposed into.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelFeature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub label_width: f64,
    pub label_height: f64,

    /// Text of the label. Parts of features with identical text may be merged into one line.
    pub label_text: Option<String>,

    /// Quadrant offset, each component in `{-1, 0, 1}`. Positive `y` is above the anchor.
    pub quad_offset: Coord,
    /// Offset applied by over-point placement when not placing around the point.
    pub position_offset: Coord,
    pub fixed_position: Option<Coord>,
    /// Data-defined rotation, in radians.
    pub fixed_angle: Option<f64>,
    pub fixed_quadrant: bool,

    /// Distance between the label and the feature.
    pub distance_label: f64,
    /// Region candidates must lie inside.
    pub permissible_zone: Option<MultiPolygon>,

    pub label_info: Option<LabelInfo>,
    /// How far a curved label may run past the ends of its line.
    pub overrun_distance: f64,
    /// Distance over which the direction of a line extension is smoothed.
    pub overrun_smoothing_distance: f64,
    /// Lines longer than this are chopped so each chunk gets its own label.
    pub repeat_distance: f64,

    /// Priority in `[0, 1]`; falls back to the layer priority when unset.
    pub priority: Option<f64>,
    pub always_show: bool,

    /// Positions tried, in order, by ordered point placement.
    pub predefined_positions: Vec<PredefinedPointPosition>,
    pub visual_margin: Margins,
    pub symbol_width: f64,
    pub symbol_height: f64,
    pub offset_type: OffsetType,
}

impl LabelFeature {
    pub fn new(id: FeatureId, geometry: Geometry, label_width: f64, label_height: f64) -> Self {
        Self {
            id,
            geometry,
            label_width,
            label_height,
            label_text: None,
            quad_offset: coord! { x: 0., y: 0. },
            position_offset: coord! { x: 0., y: 0. },
            fixed_position: None,
            fixed_angle: None,
            fixed_quadrant: false,
            distance_label: 0.,
            permissible_zone: None,
            label_info: None,
            overrun_distance: 0.,
            overrun_smoothing_distance: 0.,
            repeat_distance: 0.,
            priority: None,
            always_show: false,
            predefined_positions: PredefinedPointPosition::DEFAULT_ORDER.to_vec(),
            visual_margin: Margins::default(),
            symbol_width: 0.,
            symbol_height: 0.,
            offset_type: OffsetType::default(),
        }
    }

    pub fn with_label_text(self, label_text: impl Into<String>) -> Self {
        Self {
            label_text: Some(label_text.into()),
            ..self
        }
    }

    pub fn with_quad_offset(self, x: f64, y: f64) -> Self {
        Self {
            quad_offset: coord! { x: x, y: y },
            ..self
        }
    }

    pub fn with_fixed_position(self, position: Coord) -> Self {
        Self {
            fixed_position: Some(position),
            ..self
        }
    }

    pub fn with_fixed_angle(self, angle: f64) -> Self {
        Self {
            fixed_angle: Some(angle),
            ..self
        }
    }

    pub fn with_distance_label(self, distance_label: f64) -> Self {
        Self {
            distance_label,
            ..self
        }
    }

    pub fn with_permissible_zone(self, zone: MultiPolygon) -> Self {
        Self {
            permissible_zone: Some(zone),
            ..self
        }
    }

    pub fn with_label_info(self, label_info: LabelInfo) -> Self {
        Self {
            label_info: Some(label_info),
            ..self
        }
    }

    pub fn with_overrun(self, distance: f64, smoothing_distance: f64) -> Self {
        Self {
            overrun_distance: distance,
            overrun_smoothing_distance: smoothing_distance,
            ..self
        }
    }

    pub fn with_repeat_distance(self, repeat_distance: f64) -> Self {
        Self {
            repeat_distance,
            ..self
        }
    }

    pub fn with_priority(self, priority: f64) -> Self {
        Self {
            priority: Some(priority),
            ..self
        }
    }

    pub fn with_always_show(self, always_show: bool) -> Self {
        Self {
            always_show,
            ..self
        }
    }

    pub fn with_predefined_positions(self, positions: Vec<PredefinedPointPosition>) -> Self {
        Self {
            predefined_positions: positions,
            ..self
        }
    }

    pub fn with_symbol(self, width: f64, height: f64, offset_type: OffsetType) -> Self {
        Self {
            symbol_width: width,
            symbol_height: height,
            offset_type,
            ..self
        }
    }

    pub fn with_visual_margin(self, visual_margin: Margins) -> Self {
        Self {
            visual_margin,
            ..self
        }
    }

    pub fn has_fixed_rotation(&self) -> bool {
        self.fixed_angle.is_some()
    }

    pub fn has_fixed_position(&self) -> bool {
        self.fixed_position.is_some()
    }
}
