//! Candidate generation strategies.
//!
//! A [`PlacementStrategy`] is picked for each feature part from its geometry kind and the
//! layer's [`Arrangement`], then [`create_candidates`] runs it and scores, prunes and indexes
//! the raw candidates.

mod curved;
mod line;
mod point;
mod polygon;

pub use curved::curved_along_line;
pub use line::along_line;
pub use point::{around_point, ordered_positions, over_point};
pub use polygon::{grid, point_on_surface_candidate, polygon_anchor};

use geo::{Coord, Rect};

use crate::cancel::CancellationToken;
use crate::cost::{add_size_penalty, sort_by_cost};
use crate::feature::{FeaturePart, GeometryKind};
use crate::geometry::functions::contains_candidate;
use crate::geometry::LabelingBoundary;
use crate::index::CandidateIndex;
use crate::label_position::{LabelPosition, Quadrant};
use crate::log::debug;
use crate::settings::{Arrangement, EngineSettings};

/// Shared inputs for a run of candidate generation.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    pub settings: &'a EngineSettings,
    pub cancel: &'a CancellationToken,
}

impl<'a> PlacementContext<'a> {
    pub fn new(settings: &'a EngineSettings, cancel: &'a CancellationToken) -> Self {
        Self { settings, cancel }
    }
}

/// Build a candidate with the part's label footprint, turning it upright when the layer asks
/// for readable straight labels.
pub(crate) fn candidate(
    part: &FeaturePart,
    x: f64,
    y: f64,
    alpha: f64,
    cost: f64,
    reversed: bool,
    quadrant: Quadrant,
) -> LabelPosition {
    let position = LabelPosition::new(
        0,
        x,
        y,
        part.label_width(),
        part.label_height(),
        alpha,
        cost,
        part.id(),
        reversed,
        quadrant,
    );
    if !part.layer().arrangement.is_curved() && part.show_upright_labels() {
        position.upright()
    } else {
        position
    }
}

/// Whether the label rectangle satisfies the feature's permissible zone, if it has one.
pub(crate) fn in_permissible_zone(part: &FeaturePart, x: f64, y: f64, alpha: f64) -> bool {
    match &part.feature().permissible_zone {
        Some(zone) => contains_candidate(
            zone,
            x,
            y,
            part.label_width(),
            part.label_height(),
            alpha,
        ),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStrategy {
    Over,
    Around,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStrategy {
    Straight,
    Curved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonStrategy {
    OverCentroid,
    AroundCentroid,
    /// Straight text along the outer ring.
    Perimeter,
    /// Curved text along the outer ring.
    CurvedPerimeter,
    Grid,
}

/// How candidates are generated for one feature part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementStrategy {
    /// Exactly one candidate at the feature's fixed position.
    Fixed(Coord),
    Point(PointStrategy),
    Line(LineStrategy),
    Polygon(PolygonStrategy),
}

impl PlacementStrategy {
    pub fn select(part: &FeaturePart) -> Self {
        let feature = part.feature();
        if let Some(position) = feature.fixed_position {
            return Self::Fixed(position);
        }

        let arrangement = part.layer().arrangement;
        match part.kind() {
            GeometryKind::Point => Self::Point(match arrangement {
                Arrangement::OrderedPositionsAroundPoint => PointStrategy::Ordered,
                Arrangement::OverPoint => PointStrategy::Over,
                _ if feature.fixed_quadrant => PointStrategy::Over,
                _ => PointStrategy::Around,
            }),
            GeometryKind::Line if arrangement.is_curved() => Self::Line(LineStrategy::Curved),
            GeometryKind::Line => Self::Line(LineStrategy::Straight),
            GeometryKind::Polygon => Self::Polygon(match arrangement {
                Arrangement::AroundPoint => PolygonStrategy::AroundCentroid,
                Arrangement::OverPoint => PolygonStrategy::OverCentroid,
                Arrangement::Line => PolygonStrategy::Perimeter,
                Arrangement::PerimeterCurved => PolygonStrategy::CurvedPerimeter,
                _ => PolygonStrategy::Grid,
            }),
        }
    }

    /// Raw candidates, before size penalty, boundary pruning and sorting.
    pub fn generate(&self, part: &FeaturePart, ctx: &PlacementContext) -> Vec<LabelPosition> {
        if part.is_empty() {
            return vec![];
        }
        let angle = part.feature().fixed_angle.unwrap_or(0.0);

        match *self {
            Self::Fixed(position) => vec![candidate(
                part,
                position.x,
                position.y,
                angle,
                0.0,
                false,
                Quadrant::Over,
            )],
            Self::Point(strategy) => {
                let Some(anchor) = part.shape().first() else {
                    return vec![];
                };
                point_candidates(part, strategy, anchor, angle, ctx)
            }
            Self::Line(LineStrategy::Straight) => along_line(part, part.shape(), true, ctx),
            Self::Line(LineStrategy::Curved) => curved_along_line(part, part.shape(), true, ctx),
            Self::Polygon(PolygonStrategy::OverCentroid) => match polygon_anchor(part) {
                Some(anchor) => over_point(part, anchor, angle),
                None => vec![],
            },
            Self::Polygon(PolygonStrategy::AroundCentroid) => match polygon_anchor(part) {
                Some(anchor) => around_point(part, anchor, angle, ctx),
                None => vec![],
            },
            Self::Polygon(PolygonStrategy::Perimeter) => along_line(part, part.shape(), false, ctx),
            Self::Polygon(PolygonStrategy::CurvedPerimeter) => {
                curved_along_line(part, part.shape(), false, ctx)
            }
            Self::Polygon(PolygonStrategy::Grid) => grid(part, ctx),
        }
    }
}

fn point_candidates(
    part: &FeaturePart,
    strategy: PointStrategy,
    anchor: Coord,
    angle: f64,
    ctx: &PlacementContext,
) -> Vec<LabelPosition> {
    match strategy {
        PointStrategy::Over => over_point(part, anchor, angle),
        PointStrategy::Around => around_point(part, anchor, angle, ctx),
        PointStrategy::Ordered => ordered_positions(part, anchor, angle),
    }
}

/// Generate, score and index every candidate for `part`.
///
/// Candidates outside `boundary` are dropped (or kept when they merely intersect it and the
/// engine shows partial labels). Survivors get ids in creation order, are inserted into
/// `index`, and are returned sorted by ascending cost.
pub fn create_candidates(
    part: &FeaturePart,
    ctx: &PlacementContext,
    extent: &Rect,
    boundary: &LabelingBoundary,
    index: &CandidateIndex,
) -> Vec<LabelPosition> {
    let strategy = PlacementStrategy::select(part);
    let mut positions = strategy.generate(part, ctx);
    if positions.is_empty() {
        debug!(part = part.id().0, "no raw candidates");
        return positions;
    }

    add_size_penalty(part, &mut positions, extent);

    let show_partial = ctx.settings.show_partial;
    positions.retain(|position| {
        if show_partial {
            boundary.intersects_candidate(position)
        } else {
            boundary.contains_candidate(position)
        }
    });

    for (id, position) in positions.iter_mut().enumerate() {
        position.set_id(id);
        index.insert(position);
    }

    sort_by_cost(&mut positions);
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::LabelFeature;
    use crate::settings::LayerSettings;
    use crate::test::layer;
    use crate::test::linestring::straight_line;
    use crate::test::point::point_feature;
    use crate::test::polygon::square;
    use approx::assert_relative_eq;
    use geo::{coord, Geometry};
    use std::sync::Arc;

    fn part(feature: LabelFeature, layer_settings: LayerSettings) -> FeaturePart {
        let geometry = feature.geometry.clone();
        FeaturePart::try_new(Arc::new(feature), Arc::new(layer_settings), &geometry).unwrap()
    }

    fn polygon_feature(arrangement: Arrangement) -> FeaturePart {
        let geometry = Geometry::Polygon(square(0., 0., 10.));
        let feature = LabelFeature::new(crate::feature::FeatureId(2), geometry, 2., 1.);
        part(feature, layer(arrangement))
    }

    #[test]
    fn strategy_selection() {
        use PlacementStrategy as S;
        let select = |arrangement| PlacementStrategy::select(&polygon_feature(arrangement));
        assert_eq!(select(Arrangement::AroundPoint), S::Polygon(PolygonStrategy::AroundCentroid));
        assert_eq!(select(Arrangement::OverPoint), S::Polygon(PolygonStrategy::OverCentroid));
        assert_eq!(select(Arrangement::Line), S::Polygon(PolygonStrategy::Perimeter));
        assert_eq!(
            select(Arrangement::PerimeterCurved),
            S::Polygon(PolygonStrategy::CurvedPerimeter)
        );
        assert_eq!(select(Arrangement::Free), S::Polygon(PolygonStrategy::Grid));
        assert_eq!(select(Arrangement::Horizontal), S::Polygon(PolygonStrategy::Grid));

        let point = part(point_feature(0., 0.), layer(Arrangement::Line));
        assert_eq!(PlacementStrategy::select(&point), S::Point(PointStrategy::Around));

        let fixed_quadrant = part(
            LabelFeature {
                fixed_quadrant: true,
                ..point_feature(0., 0.).with_quad_offset(1., 0.)
            },
            layer(Arrangement::AroundPoint),
        );
        assert_eq!(PlacementStrategy::select(&fixed_quadrant), S::Point(PointStrategy::Over));

        let line = Geometry::LineString(straight_line(10.));
        let curved = part(
            LabelFeature::new(crate::feature::FeatureId(3), line, 4., 1.),
            layer(Arrangement::Curved),
        );
        assert_eq!(PlacementStrategy::select(&curved), S::Line(LineStrategy::Curved));
    }

    #[test]
    fn fixed_position_yields_single_candidate() {
        let p = part(
            point_feature(0., 0.)
                .with_fixed_position(coord! { x: 3., y: 4. })
                .with_fixed_angle(0.5),
            layer(Arrangement::AroundPoint),
        );
        let strategy = PlacementStrategy::select(&p);
        assert_eq!(strategy, PlacementStrategy::Fixed(coord! { x: 3., y: 4. }));

        let settings = EngineSettings::default();
        let cancel = CancellationToken::new();
        let positions = strategy.generate(&p, &PlacementContext::new(&settings, &cancel));
        assert_eq!(positions.len(), 1);
        assert_relative_eq!(positions[0].x(), 3.);
        assert_relative_eq!(positions[0].y(), 4.);
        assert_relative_eq!(positions[0].alpha(), 0.5);
        assert_relative_eq!(positions[0].cost(), 0.);
    }

    #[test]
    fn pipeline_prunes_indexes_and_sorts() {
        let settings = EngineSettings {
            candidates_point: 8,
            ..Default::default()
        };
        let cancel = CancellationToken::new();
        let ctx = PlacementContext::new(&settings, &cancel);
        let p = part(point_feature(0., 0.), layer(Arrangement::AroundPoint));

        // extent covering only the right half of the plane around the point
        let extent = Rect::new(coord! { x: 0., y: -5. }, coord! { x: 5., y: 5. });
        let boundary = LabelingBoundary::from_rect(extent);
        let index = CandidateIndex::new();

        let positions = create_candidates(&p, &ctx, &extent, &boundary, &index);
        assert!(!positions.is_empty());
        assert!(positions.len() < 8);
        assert_eq!(index.len(), positions.len());
        for position in &positions {
            assert!(position.bounding_rect().minx >= 0.);
        }
        for pair in positions.windows(2) {
            assert!(pair[0].cost() <= pair[1].cost());
        }

        // partial candidates survive when they only intersect the boundary
        let partial_settings = EngineSettings {
            show_partial: true,
            ..settings
        };
        let partial_ctx = PlacementContext::new(&partial_settings, &cancel);
        let partial =
            create_candidates(&p, &partial_ctx, &extent, &boundary, &CandidateIndex::new());
        assert!(partial.len() > positions.len());
    }

    #[test]
    fn empty_part_has_no_candidates() {
        let settings = EngineSettings::default();
        let cancel = CancellationToken::new();
        let ctx = PlacementContext::new(&settings, &cancel);
        let geometry = Geometry::LineString(geo::LineString::new(vec![]));
        let feature = LabelFeature::new(crate::feature::FeatureId(4), geometry, 4., 1.);
        let p = part(feature, layer(Arrangement::Line));
        assert!(p.is_empty());
        let extent = Rect::new(coord! { x: 0., y: 0. }, coord! { x: 10., y: 10. });
        let index = CandidateIndex::new();
        let positions =
            create_candidates(&p, &ctx, &extent, &LabelingBoundary::from_rect(extent), &index);
        assert!(positions.is_empty());
        assert_eq!(index.len(), 0);
    }
}
