//! Spatial index of every candidate generated during a labeling pass.

use std::sync::{Mutex, PoisonError};

use rstar::{RTree, RTreeObject, AABB};

use crate::feature::PartId;
use crate::geometry::BoundingRect;
use crate::label_position::LabelPosition;

/// Index entry: which candidate of which part, and its envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedCandidate {
    pub part: PartId,
    pub candidate: usize,
    envelope: AABB<[f64; 2]>,
}

impl IndexedCandidate {
    pub fn new(position: &LabelPosition) -> Self {
        Self {
            part: position.part(),
            candidate: position.id(),
            envelope: position.envelope(),
        }
    }
}

impl RTreeObject for IndexedCandidate {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree of candidate envelopes, safe to fill from several worker threads.
#[derive(Debug)]
pub struct CandidateIndex {
    tree: Mutex<RTree<IndexedCandidate>>,
}

impl Default for CandidateIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateIndex {
    pub fn new() -> Self {
        Self {
            tree: Mutex::new(RTree::new()),
        }
    }

    pub fn insert(&self, position: &LabelPosition) {
        self.lock().insert(IndexedCandidate::new(position));
    }

    pub fn len(&self) -> usize {
        self.lock().size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Candidates whose envelope intersects `rect`.
    pub fn query(&self, rect: &BoundingRect) -> Vec<IndexedCandidate> {
        let envelope: AABB<[f64; 2]> = (*rect).into();
        self.lock()
            .locate_in_envelope_intersecting(&envelope)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RTree<IndexedCandidate>> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
