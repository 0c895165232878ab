use geo::{coord, polygon, Coord, LineString, Polygon};

/// Closed counter-clockwise ring of a square with its lower-left corner at `(x, y)`.
pub(crate) fn square_ring(x: f64, y: f64, size: f64) -> Vec<Coord> {
    vec![
        coord! { x: x, y: y },
        coord! { x: x + size, y: y },
        coord! { x: x + size, y: y + size },
        coord! { x: x, y: y + size },
        coord! { x: x, y: y },
    ]
}

pub(crate) fn square(x: f64, y: f64, size: f64) -> Polygon {
    Polygon::new(LineString::new(square_ring(x, y, size)), vec![])
}

pub(crate) fn l_shape() -> Polygon {
    polygon![
        (x: 0., y: 0.),
        (x: 4., y: 0.),
        (x: 4., y: 1.),
        (x: 1., y: 1.),
        (x: 1., y: 4.),
        (x: 0., y: 4.),
        (x: 0., y: 0.),
    ]
}

/// 10 x 10 square with a 2 x 2 hole in its middle.
pub(crate) fn square_with_hole() -> Polygon {
    Polygon::new(
        LineString::new(square_ring(0., 0., 10.)),
        vec![LineString::new(square_ring(4., 4., 2.))],
    )
}
