use std::sync::Arc;

use geo::{Coord, Geometry, LineString, Point, Polygon};

use crate::error::{LabelError, Result};
use crate::feature::LabelFeature;
use crate::geometry::{PointSet, ShapeArena, ShapeId};
use crate::label_position::Quadrant;
use crate::settings::{LayerSettings, UpsideDownLabels};

/// Identifier of a feature part within a labeling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PartId(pub usize);

/// Geometry type of a feature part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

/// Arena slot of a part's outer ring (or path, or point).
pub(crate) const OUTER: ShapeId = ShapeId(0);

/// Priority assigned to always-shown features, dominating any regular priority.
const ALWAYS_SHOW_PRIORITY: f64 = -0.2;

/// One single-geometry unit of a [`LabelFeature`] that candidates are generated for.
///
/// The outer ring lives at [`ShapeId`] 0 of the part's arena. Holes follow, each linked to
/// the outer ring as its parent.
#[derive(Debug, Clone)]
pub struct FeaturePart {
    id: PartId,
    feature: Arc<LabelFeature>,
    layer: Arc<LayerSettings>,
    kind: GeometryKind,
    pub(crate) shapes: ShapeArena,
    total_repeats: usize,
    connected_group: Option<usize>,
}

impl FeaturePart {
    /// Build a part from a single (non-collection) geometry.
    ///
    /// Geometries without coordinates give a part with no points, which yields no
    /// candidates.
    pub fn try_new(
        feature: Arc<LabelFeature>,
        layer: Arc<LayerSettings>,
        geometry: &Geometry,
    ) -> Result<Self> {
        let mut shapes = ShapeArena::new();
        let kind = match geometry {
            Geometry::Point(point) => {
                shapes.push(PointSet::new(vec![point.0]));
                GeometryKind::Point
            }
            Geometry::Line(line) => {
                shapes.push(PointSet::new(vec![line.start, line.end]));
                GeometryKind::Line
            }
            Geometry::LineString(line_string) => {
                shapes.push(PointSet::from_line_string(line_string));
                GeometryKind::Line
            }
            Geometry::Polygon(polygon) => {
                push_polygon(&mut shapes, polygon);
                GeometryKind::Polygon
            }
            Geometry::Rect(rect) => {
                push_polygon(&mut shapes, &rect.to_polygon());
                GeometryKind::Polygon
            }
            Geometry::Triangle(triangle) => {
                push_polygon(&mut shapes, &triangle.to_polygon());
                GeometryKind::Polygon
            }
            other => {
                return Err(LabelError::IncorrectGeometryType(
                    geometry_type_name(other).to_string(),
                ))
            }
        };

        Ok(Self {
            id: PartId::default(),
            feature,
            layer,
            kind,
            shapes,
            total_repeats: 1,
            connected_group: None,
        })
    }

    pub fn with_id(self, id: PartId) -> Self {
        Self { id, ..self }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn feature(&self) -> &Arc<LabelFeature> {
        &self.feature
    }

    pub fn layer(&self) -> &Arc<LayerSettings> {
        &self.layer
    }

    /// The outer ring, path or point.
    pub fn shape(&self) -> &PointSet {
        &self.shapes[OUTER]
    }

    pub fn nb_points(&self) -> usize {
        self.shape().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shape().is_empty()
    }

    pub fn holes(&self) -> impl Iterator<Item = &PointSet> + '_ {
        self.shapes.children_of(OUTER).map(|(_, hole)| hole)
    }

    /// Shape a hole belongs to.
    pub fn hole_parent(&self, hole: ShapeId) -> Option<ShapeId> {
        self.shapes.parent_of(hole)
    }

    /// Whether `c` lies inside the outer ring and outside every hole.
    pub fn contains_point(&self, c: Coord) -> bool {
        self.kind == GeometryKind::Polygon
            && self.shape().contains_point(c)
            && !self.holes().any(|hole| hole.contains_point(c))
    }

    pub fn polygon(&self) -> Polygon {
        Polygon::new(
            self.shape().to_line_string(),
            self.holes().map(|hole| hole.to_line_string()).collect(),
        )
    }

    pub fn to_geometry(&self) -> Geometry {
        match self.kind {
            GeometryKind::Point => match self.shape().first() {
                Some(c) => Geometry::Point(Point(c)),
                None => Geometry::LineString(LineString::new(vec![])),
            },
            GeometryKind::Line => Geometry::LineString(self.shape().to_line_string()),
            GeometryKind::Polygon => Geometry::Polygon(self.polygon()),
        }
    }

    pub fn label_width(&self) -> f64 {
        self.feature.label_width
    }

    pub fn label_height(&self) -> f64 {
        self.feature.label_height
    }

    pub fn distance_label(&self) -> f64 {
        self.feature.distance_label
    }

    pub fn total_repeats(&self) -> usize {
        self.total_repeats
    }

    pub fn set_total_repeats(&mut self, total_repeats: usize) {
        self.total_repeats = total_repeats;
    }

    pub fn connected_group(&self) -> Option<usize> {
        self.connected_group
    }

    pub(crate) fn set_connected_group(&mut self, group: Option<usize>) {
        self.connected_group = group;
    }

    /// Quadrant named by the feature's quadrant offset.
    pub fn quadrant_from_offset(&self) -> Quadrant {
        let offset = self.feature.quad_offset;
        match (sign(offset.x), sign(offset.y)) {
            (-1, 1) => Quadrant::AboveLeft,
            (-1, -1) => Quadrant::BelowLeft,
            (-1, _) => Quadrant::Left,
            (1, 1) => Quadrant::AboveRight,
            (1, -1) => Quadrant::BelowRight,
            (1, _) => Quadrant::Right,
            (_, 1) => Quadrant::Above,
            (_, -1) => Quadrant::Below,
            _ => Quadrant::Over,
        }
    }

    /// Priority handed to the optimizer. Lower values win.
    pub fn calculate_priority(&self) -> f64 {
        if self.feature.always_show {
            return ALWAYS_SHOW_PRIORITY;
        }
        self.feature.priority.unwrap_or(self.layer.priority)
    }

    /// Whether candidates reading upside-down should be turned.
    pub fn show_upright_labels(&self) -> bool {
        match self.layer.upside_down {
            UpsideDownLabels::Upright => true,
            UpsideDownLabels::ShowAll => false,
            UpsideDownLabels::ShowDefined => match self.feature.fixed_angle {
                None => true,
                Some(angle) => !self.feature.has_fixed_position() && angle == 0.0,
            },
        }
    }

    /// Whether both parts label the same logical feature: same layer and either the same
    /// feature or the same group of merged connected lines.
    pub fn has_same_label_feature_as(&self, other: &FeaturePart) -> bool {
        if self.layer.name != other.layer.name {
            return false;
        }
        if self.feature.id == other.feature.id {
            return true;
        }
        matches!(
            (self.connected_group, other.connected_group),
            (Some(a), Some(b)) if a == b
        )
    }
}

fn push_polygon(shapes: &mut ShapeArena, polygon: &Polygon) {
    let outer = shapes.push(PointSet::from_line_string(polygon.exterior()));
    for interior in polygon.interiors() {
        let mut hole = PointSet::from_line_string(interior).with_parent(outer);
        hole.make_clockwise();
        shapes.push(hole);
    }
}

fn sign(value: f64) -> i8 {
    if value < 0.0 {
        -1
    } else if value > 0.0 {
        1
    } else {
        0
    }
}

pub(crate) fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureId;
    use crate::settings::Arrangement;
    use crate::test::point::point_feature;
    use crate::test::layer;
    use crate::test::polygon::square_with_hole;
    use geo::{coord, MultiPoint};

    fn part_for(feature: LabelFeature, layer_settings: LayerSettings) -> FeaturePart {
        let geometry = feature.geometry.clone();
        FeaturePart::try_new(Arc::new(feature), Arc::new(layer_settings), &geometry).unwrap()
    }

    #[test]
    fn holes_are_linked_and_clockwise() {
        let polygon = square_with_hole();
        let feature = LabelFeature::new(FeatureId(1), polygon.clone().into(), 2., 1.);
        let part = part_for(feature, layer(Arrangement::Free));

        assert_eq!(part.kind(), GeometryKind::Polygon);
        assert_eq!(part.holes().count(), 1);
        assert_eq!(part.hole_parent(ShapeId(1)), Some(OUTER));
        assert!(part.holes().all(|hole| hole.is_clockwise()));

        assert!(part.contains_point(coord! { x: 1., y: 1. }));
        assert!(!part.contains_point(coord! { x: 5., y: 5. }));
    }

    #[test]
    fn empty_geometry_has_no_points() {
        let feature = LabelFeature::new(
            FeatureId(1),
            Geometry::LineString(LineString::new(vec![])),
            2.,
            1.,
        );
        let part = part_for(feature, layer(Arrangement::Line));
        assert_eq!(part.nb_points(), 0);
        assert!(part.is_empty());
    }

    #[test]
    fn collections_are_rejected() {
        let geometry = Geometry::MultiPoint(MultiPoint::new(vec![]));
        let feature = Arc::new(LabelFeature::new(FeatureId(1), geometry.clone(), 2., 1.));
        let err = FeaturePart::try_new(feature, Arc::new(LayerSettings::default()), &geometry)
            .unwrap_err();
        assert!(matches!(err, LabelError::IncorrectGeometryType(name) if name == "MultiPoint"));
    }

    #[test]
    fn quadrants() {
        let quadrant = |x: f64, y: f64| {
            part_for(
                point_feature(0., 0.).with_quad_offset(x, y),
                LayerSettings::default(),
            )
            .quadrant_from_offset()
        };
        assert_eq!(quadrant(0., 0.), Quadrant::Over);
        assert_eq!(quadrant(1., 1.), Quadrant::AboveRight);
        assert_eq!(quadrant(-1., 0.), Quadrant::Left);
        assert_eq!(quadrant(0., -1.), Quadrant::Below);
        assert_eq!(quadrant(-1., -1.), Quadrant::BelowLeft);
    }

    #[test]
    fn priority_fallbacks() {
        let layer_settings = LayerSettings::default().with_priority(0.3);
        let part = part_for(point_feature(0., 0.), layer_settings.clone());
        assert_eq!(part.calculate_priority(), 0.3);

        let part = part_for(point_feature(0., 0.).with_priority(0.8), layer_settings.clone());
        assert_eq!(part.calculate_priority(), 0.8);

        let part = part_for(
            point_feature(0., 0.).with_priority(0.8).with_always_show(true),
            layer_settings,
        );
        assert_eq!(part.calculate_priority(), -0.2);
    }

    #[test]
    fn upright_policy() {
        let defined = LayerSettings::default().with_upside_down(UpsideDownLabels::ShowDefined);

        let part = part_for(point_feature(0., 0.), defined.clone());
        assert!(part.show_upright_labels());

        let part = part_for(point_feature(0., 0.).with_fixed_angle(0.5), defined.clone());
        assert!(!part.show_upright_labels());

        let part = part_for(point_feature(0., 0.).with_fixed_angle(0.), defined);
        assert!(part.show_upright_labels());

        let all = LayerSettings::default().with_upside_down(UpsideDownLabels::ShowAll);
        assert!(!part_for(point_feature(0., 0.), all).show_upright_labels());
    }

    #[test]
    fn same_label_feature() {
        let layer_settings = Arc::new(LayerSettings::new("roads", Arrangement::Line));
        let make = |id: u64| {
            let feature = Arc::new(LabelFeature {
                id: FeatureId(id),
                ..point_feature(0., 0.)
            });
            let geometry = feature.geometry.clone();
            FeaturePart::try_new(feature, layer_settings.clone(), &geometry).unwrap()
        };

        let a = make(1);
        let b = make(1);
        let mut c = make(2);
        assert!(a.has_same_label_feature_as(&b));
        assert!(!a.has_same_label_feature_as(&c));

        let mut a = a;
        a.set_connected_group(Some(7));
        c.set_connected_group(Some(7));
        assert!(a.has_same_label_feature_as(&c));

        let other_layer = FeaturePart::try_new(
            c.feature().clone(),
            Arc::new(LayerSettings::new("rivers", Arrangement::Line)),
            &c.to_geometry(),
        )
        .unwrap();
        assert!(!c.has_same_label_feature_as(&other_layer));
    }
}
