//! Layers, feature registration and the candidate extraction pass.

use std::sync::Arc;

use geo::{Geometry, Rect};
use indexmap::IndexMap;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::error::{LabelError, Result};
use crate::feature::{geometry_type_name, FeaturePart, GeometryKind, LabelFeature, PartId};
use crate::geometry::LabelingBoundary;
use crate::index::CandidateIndex;
use crate::label_position::LabelPosition;
use crate::log::debug;
use crate::placement::{create_candidates, PlacementContext};
use crate::settings::{EngineSettings, LayerSettings};

/// A named group of features sharing placement settings.
#[derive(Debug, Clone)]
pub struct Layer {
    settings: Arc<LayerSettings>,
    parts: Vec<FeaturePart>,
}

impl Layer {
    fn new(settings: LayerSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            parts: Vec::new(),
        }
    }

    pub fn settings(&self) -> &LayerSettings {
        &self.settings
    }

    /// Parts registered so far, before merging and chopping.
    pub fn parts(&self) -> &[FeaturePart] {
        &self.parts
    }
}

/// Entry point of the labeling pass.
///
/// ```
/// use geo::{coord, point, Geometry, Rect};
/// use geolabel::{
///     Arrangement, CancellationToken, Engine, EngineSettings, FeatureId, LabelFeature,
///     LabelingBoundary, LayerSettings,
/// };
///
/// let mut engine = Engine::new(EngineSettings::default());
/// engine.add_layer(LayerSettings::new("places", Arrangement::AroundPoint)).unwrap();
///
/// let feature = LabelFeature::new(FeatureId(1), Geometry::Point(point!(x: 50., y: 50.)), 8., 2.);
/// engine.register_feature("places", feature).unwrap();
///
/// let extent = Rect::new(coord! { x: 0., y: 0. }, coord! { x: 100., y: 100. });
/// let problem = engine.extract_problem(
///     &extent,
///     &LabelingBoundary::from_rect(extent),
///     &CancellationToken::new(),
/// );
/// assert_eq!(problem.parts().len(), 1);
/// assert_eq!(problem.candidate_count(), 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    settings: EngineSettings,
    layers: IndexMap<String, Layer>,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            layers: IndexMap::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn add_layer(&mut self, settings: LayerSettings) -> Result<()> {
        if self.layers.contains_key(&settings.name) {
            return Err(LabelError::DuplicateLayer(settings.name));
        }
        self.layers.insert(settings.name.clone(), Layer::new(settings));
        Ok(())
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Layers in the order they were added.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.values()
    }

    /// Split `feature` into single-geometry parts and add them to `layer`.
    ///
    /// Multi-geometries and collections are flattened; parts without coordinates are skipped.
    /// Returns the number of parts added.
    pub fn register_feature(&mut self, layer: &str, feature: LabelFeature) -> Result<usize> {
        let layer = self
            .layers
            .get_mut(layer)
            .ok_or_else(|| LabelError::UnknownLayer(layer.to_string()))?;

        let mut geometries = Vec::new();
        flatten(&feature.geometry, &mut geometries);

        let feature = Arc::new(feature);
        let mut added = 0;
        for geometry in geometries {
            let part = FeaturePart::try_new(feature.clone(), layer.settings.clone(), &geometry)?;
            if part.is_empty() {
                debug!(
                    feature = feature.id.0,
                    geometry = geometry_type_name(&geometry),
                    "skipping empty part"
                );
                continue;
            }
            layer.parts.push(part);
            added += 1;
        }

        if added == 0 {
            return Err(LabelError::InvalidGeometry(format!(
                "feature {} has no coordinates",
                feature.id.0
            )));
        }
        Ok(added)
    }

    /// Generate candidates for every registered part.
    ///
    /// Connected lines sharing a label text are merged first on layers that ask for it, then
    /// lines are chopped at their repeat distance. Part ids in the returned [`Problem`] follow
    /// layer order, then registration order. Once `cancel` fires, the remaining parts get no
    /// candidates.
    pub fn extract_problem(
        &self,
        extent: &Rect,
        boundary: &LabelingBoundary,
        cancel: &CancellationToken,
    ) -> Problem {
        let mut next_group = 0;
        let mut parts = Vec::new();
        for layer in self.layers.values() {
            let layer_parts = if layer.settings.merge_connected_lines {
                merge_connected_lines(layer.parts.clone(), &mut next_group)
            } else {
                layer.parts.clone()
            };
            for part in layer_parts {
                parts.extend(chop_at_repeat_distance(part));
            }
        }
        let parts = parts
            .into_iter()
            .enumerate()
            .map(|(id, part)| part.with_id(PartId(id)))
            .collect::<Vec<_>>();

        let index = CandidateIndex::new();
        let ctx = PlacementContext::new(&self.settings, cancel);
        let generate = |part: &FeaturePart| {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            create_candidates(part, &ctx, extent, boundary, &index)
        };

        #[cfg(feature = "rayon")]
        let candidates = {
            let mut output_vec = Vec::with_capacity(parts.len());
            parts
                .par_iter()
                .map(generate)
                .collect_into_vec(&mut output_vec);
            output_vec
        };

        #[cfg(not(feature = "rayon"))]
        let candidates = parts.iter().map(generate).collect::<Vec<_>>();

        if cancel.is_cancelled() {
            debug!("labeling pass cancelled");
        }

        Problem {
            parts,
            candidates,
            index,
        }
    }
}

/// Collect every single geometry in `geometry`.
fn flatten(geometry: &Geometry, out: &mut Vec<Geometry>) {
    match geometry {
        Geometry::MultiPoint(points) => out.extend(points.iter().copied().map(Geometry::Point)),
        Geometry::MultiLineString(lines) => {
            out.extend(lines.iter().cloned().map(Geometry::LineString))
        }
        Geometry::MultiPolygon(polygons) => {
            out.extend(polygons.iter().cloned().map(Geometry::Polygon))
        }
        Geometry::GeometryCollection(collection) => {
            for geometry in collection.iter() {
                flatten(geometry, out);
            }
        }
        other => out.push(other.clone()),
    }
}

/// Merge touching lines that carry the same label text into continuous lines.
///
/// Every merged line gets its own connected group id.
fn merge_connected_lines(parts: Vec<FeaturePart>, next_group: &mut usize) -> Vec<FeaturePart> {
    let mut by_text: IndexMap<String, Vec<FeaturePart>> = IndexMap::new();
    let mut result = Vec::new();
    for part in parts {
        let text = match part.kind() {
            GeometryKind::Line => part.feature().label_text.clone(),
            _ => None,
        };
        match text {
            Some(text) => by_text.entry(text).or_default().push(part),
            None => result.push(part),
        }
    }

    for (_, mut pending) in by_text {
        pending.reverse();
        while let Some(mut current) = pending.pop() {
            let mut merged = false;
            while let Some(i) = pending
                .iter()
                .position(|other| current.is_connected(other) && current.merge_with(other))
            {
                pending.remove(i);
                merged = true;
            }
            if merged {
                current.set_connected_group(Some(*next_group));
                *next_group += 1;
            }
            result.push(current);
        }
    }
    result
}

/// Replace a line with one part per repeat-distance chunk.
fn chop_at_repeat_distance(part: FeaturePart) -> Vec<FeaturePart> {
    if part.kind() != GeometryKind::Line || part.feature().repeat_distance <= 0.0 {
        return vec![part];
    }

    let chunks = part.chop_at_repeat_distance();
    let total_repeats = chunks.len();
    let chopped = chunks
        .into_iter()
        .filter_map(|chunk| {
            FeaturePart::try_new(
                part.feature().clone(),
                part.layer().clone(),
                &Geometry::LineString(chunk),
            )
            .ok()
        })
        .map(|mut chunk| {
            chunk.set_total_repeats(total_repeats);
            chunk.set_connected_group(part.connected_group());
            chunk
        })
        .collect::<Vec<_>>();

    if chopped.is_empty() {
        vec![part]
    } else {
        chopped
    }
}

/// Everything the optimizer needs: the parts, their scored candidates and the shared index.
#[derive(Debug)]
pub struct Problem {
    parts: Vec<FeaturePart>,
    candidates: Vec<Vec<LabelPosition>>,
    index: CandidateIndex,
}

impl Problem {
    pub fn parts(&self) -> &[FeaturePart] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&FeaturePart> {
        self.parts.get(id.0)
    }

    /// Candidates of a part, sorted by ascending cost.
    pub fn candidates(&self, id: PartId) -> &[LabelPosition] {
        self.candidates.get(id.0).map_or(&[], Vec::as_slice)
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.iter().map(Vec::len).sum()
    }

    /// Parts together with their candidates.
    pub fn iter(&self) -> impl Iterator<Item = (&FeaturePart, &[LabelPosition])> + '_ {
        self.parts
            .iter()
            .zip(self.candidates.iter().map(Vec::as_slice))
    }

    pub fn priority(&self, id: PartId) -> Option<f64> {
        self.part(id).map(FeaturePart::calculate_priority)
    }

    pub fn index(&self) -> &CandidateIndex {
        &self.index
    }

    /// Whether two parts label the same logical feature and must not compete.
    pub fn same_label_group(&self, a: PartId, b: PartId) -> bool {
        match (self.part(a), self.part(b)) {
            (Some(a), Some(b)) => a.has_same_label_feature_as(b),
            _ => false,
        }
    }
}
