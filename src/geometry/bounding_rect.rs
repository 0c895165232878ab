use geo::{coord, Coord, Rect};
use rstar::AABB;

/// Axis-aligned bounds accumulated from individual coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingRect {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingRect {
    /// New, empty bounds. Adding any coordinate makes them valid.
    pub fn new() -> Self {
        BoundingRect {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: -f64::INFINITY,
            maxy: -f64::INFINITY,
        }
    }

    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Self {
        let mut rect = Self::new();
        for c in coords {
            rect.update(*c);
        }
        rect
    }

    pub fn update(&mut self, c: Coord) {
        if c.x < self.minx {
            self.minx = c.x;
        }
        if c.y < self.miny {
            self.miny = c.y;
        }
        if c.x > self.maxx {
            self.maxx = c.x;
        }
        if c.y > self.maxy {
            self.maxy = c.y;
        }
    }

    pub fn add_rect(&mut self, other: &BoundingRect) {
        if other.is_empty() {
            return;
        }
        self.update(coord! { x: other.minx, y: other.miny });
        self.update(coord! { x: other.maxx, y: other.maxy });
    }

    pub fn is_empty(&self) -> bool {
        self.minx > self.maxx || self.miny > self.maxy
    }

    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width() * self.height()
        }
    }
}

impl Default for BoundingRect {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BoundingRect> for Rect {
    fn from(value: BoundingRect) -> Self {
        let min_coord = coord! { x: value.minx, y: value.miny };
        let max_coord = coord! { x: value.maxx, y: value.maxy };
        Rect::new(min_coord, max_coord)
    }
}

impl From<Rect> for BoundingRect {
    fn from(value: Rect) -> Self {
        BoundingRect {
            minx: value.min().x,
            miny: value.min().y,
            maxx: value.max().x,
            maxy: value.max().y,
        }
    }
}

impl From<BoundingRect> for AABB<[f64; 2]> {
    fn from(value: BoundingRect) -> Self {
        AABB::from_corners([value.minx, value.miny], [value.maxx, value.maxy])
    }
}
