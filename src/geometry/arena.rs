use std::ops::Index;

use crate::geometry::PointSet;

/// Index of a shape inside a [`ShapeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

/// Flat storage for related rings.
///
/// Parent links between shapes (a hole and the ring enclosing it, or a split fragment and the
/// shape it was cut from) are stored as [`ShapeId`]s into the same arena, so cloning the arena
/// keeps every link valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeArena {
    shapes: Vec<PointSet>,
}

impl ShapeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: PointSet) -> ShapeId {
        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn get(&self, id: ShapeId) -> Option<&PointSet> {
        self.shapes.get(id.0)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut PointSet> {
        self.shapes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Parent of `id`, if it has one.
    pub fn parent_of(&self, id: ShapeId) -> Option<ShapeId> {
        self.get(id).and_then(|shape| shape.parent())
    }

    /// All shapes whose parent is `id`, in insertion order.
    pub fn children_of(&self, id: ShapeId) -> impl Iterator<Item = (ShapeId, &PointSet)> + '_ {
        self.iter()
            .filter(move |(_, shape)| shape.parent() == Some(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &PointSet)> + '_ {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, shape)| (ShapeId(i), shape))
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl Index<ShapeId> for ShapeArena {
    type Output = PointSet;

    fn index(&self, id: ShapeId) -> &Self::Output {
        &self.shapes[id.0]
    }
}
