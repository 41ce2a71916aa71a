//! Planar geometry: integer bounding boxes, points and polygons.

mod bbox;
mod polygon;

pub use bbox::{BBox, iou_batch, reference_point};
pub use polygon::{Point, Polygon, point_in_polygon};
