use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Closed simple polygon with at least three vertices. Need not be convex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Build a polygon, rejecting vertex lists that cannot enclose an area.
    pub fn new(vertices: Vec<Point>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::DegeneratePolygon {
                vertices: vertices.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// Convenience constructor from `(x, y)` pairs.
    pub fn from_coords(coords: &[(i32, i32)]) -> Result<Self, GeometryError> {
        Self::new(coords.iter().copied().map(Point::from).collect())
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    // Never true: construction guarantees three vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.vertices)
    }

    pub fn into_vertices(self) -> Vec<Point> {
        self.vertices
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

/// Ray-casting point-in-polygon test.
///
/// Casts a horizontal ray to the right of `point` and counts edge crossings;
/// an odd count means inside. An edge takes part only when
/// `min(y1, y2) < y <= max(y1, y2)`, which excludes horizontal edges and
/// counts a vertex shared by two edges exactly once.
///
/// Returns `false` for fewer than three vertices.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let x = f64::from(point.x);
    let y = f64::from(point.y);
    let mut inside = false;

    let edges = vertices.iter().zip(vertices.iter().cycle().skip(1));
    for (p1, p2) in edges {
        let (p1x, p1y) = (f64::from(p1.x), f64::from(p1.y));
        let (p2x, p2y) = (f64::from(p2.x), f64::from(p2.y));

        if y <= p1y.min(p2y) || y > p1y.max(p2y) || x > p1x.max(p2x) {
            continue;
        }

        // p1y != p2y here, the half-open y range rules out horizontal edges
        let crosses = p1x == p2x || x <= (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
        if crosses {
            inside = !inside;
        }
    }

    inside
}
