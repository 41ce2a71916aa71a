use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Axis-aligned bounding box in TLBR format with integer pixel coordinates.
///
/// A well-formed box has `x1 < x2` and `y1 < y2`. Malformed boxes are not
/// rejected here; their area is clamped to zero so they never overlap anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x1: i32,
    /// Top edge
    pub y1: i32,
    /// Right edge
    pub x2: i32,
    /// Bottom edge
    pub y2: i32,
}

impl BBox {
    /// Create a box from TLBR coordinates (x1, y1, x2, y2).
    #[inline]
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x.saturating_add(width),
            y2: y.saturating_add(height),
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [i64; 4] {
        [
            i64::from(self.x1),
            i64::from(self.y1),
            self.width(),
            self.height(),
        ]
    }

    /// Signed width; negative for inverted boxes. Computed in `i64` since the
    /// span of two `i32` edges can exceed `i32::MAX`.
    #[inline]
    pub fn width(&self) -> i64 {
        i64::from(self.x2) - i64::from(self.x1)
    }

    #[inline]
    pub fn height(&self) -> i64 {
        i64::from(self.y2) - i64::from(self.y1)
    }

    /// True when the box encloses no area (`x1 >= x2` or `y1 >= y2`).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    /// Area of the box, clamped to zero for inverted boxes. Saturates for
    /// boxes spanning nearly the whole `i32` plane.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width().max(0).saturating_mul(self.height().max(0))
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(midpoint(self.x1, self.x2), midpoint(self.y1, self.y2))
    }

    /// Bottom-center of the box: where a standing person touches the ground.
    #[inline]
    pub fn bottom_center(&self) -> Point {
        Point::new(midpoint(self.x1, self.x2), self.y2)
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    ///
    /// Returns exactly `0.0` when the boxes do not overlap or when either box
    /// is degenerate.
    pub fn iou(&self, other: &BBox) -> f64 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 < x1 || y2 < y1 {
            return 0.0;
        }

        // f64 keeps the union of two plane-sized boxes in range
        let inter_area = span(x1, x2) * span(y1, y2);
        let union_area = self.area_f64() + other.area_f64() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }

    fn area_f64(&self) -> f64 {
        span(self.x1, self.x2).max(0.0) * span(self.y1, self.y2).max(0.0)
    }
}

/// Point used to decide whether a tracked person stands inside a zone.
#[inline]
pub fn reference_point(bbox: &BBox) -> Point {
    bbox.bottom_center()
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[BBox], boxes_b: &[BBox]) -> Array2<f64> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}

fn span(from: i32, to: i32) -> f64 {
    (i64::from(to) - i64::from(from)) as f64
}

// Truncates toward zero and cannot overflow.
fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_conversions() {
        let bbox = BBox::from_tlwh(10, 20, 30, 40);

        assert_eq!(bbox.to_tlbr(), [10, 20, 40, 60]);
        assert_eq!(bbox.to_tlwh(), [10, 20, 30, 40]);
        assert_eq!(bbox.area(), 1200);
        assert_eq!(bbox.center(), Point::new(25, 40));
    }

    #[test]
    fn test_bottom_center() {
        let bbox = BBox::new(10, 20, 41, 100);
        // (10 + 41) / 2 truncates to 25
        assert_eq!(bbox.bottom_center(), Point::new(25, 100));
        assert_eq!(reference_point(&bbox), bbox.bottom_center());
    }

    #[test]
    fn test_iou() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(5, 5, 15, 15);

        // Intersection: 5x5 = 25
        // Union: 100 + 100 - 25 = 175
        let iou = a.iou(&b);
        assert!((iou - 25.0 / 175.0).abs() < 1e-12);
    }

    #[test]
    fn test_iou_is_symmetric() {
        let a = BBox::new(3, 7, 40, 90);
        let b = BBox::new(20, 0, 55, 60);
        assert_eq!(a.iou(&b), b.iou(&a));
    }

    #[test]
    fn test_iou_same_box() {
        let a = BBox::new(12, 34, 56, 178);
        assert_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(20, 20, 30, 30);
        assert_eq!(a.iou(&b), 0.0);

        // touching edges share no area
        let c = BBox::new(10, 0, 20, 10);
        assert_eq!(a.iou(&c), 0.0);
    }

    #[test]
    fn test_malformed_box_never_overlaps() {
        let inverted = BBox::new(50, 50, 10, 10);
        let normal = BBox::new(0, 0, 100, 100);

        assert!(inverted.is_degenerate());
        assert_eq!(inverted.area(), 0);
        assert_eq!(inverted.iou(&normal), 0.0);
        assert_eq!(normal.iou(&inverted), 0.0);
        assert_eq!(inverted.iou(&inverted), 0.0);
    }

    #[test]
    fn test_extreme_span_does_not_overflow() {
        let wide = BBox::new(i32::MIN, 0, i32::MAX, 100);
        assert_eq!(wide.width(), i64::from(u32::MAX));
        assert_eq!(wide.area(), i64::from(u32::MAX) * 100);

        let person = BBox::new(0, 0, 40, 100);
        let iou = wide.iou(&person);
        assert!(iou > 0.0 && iou < 1e-6);
        assert_eq!(person.iou(&wide), iou);
        assert_eq!(wide.iou(&wide), 1.0);

        let plane = BBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(plane.area(), i64::MAX);
        assert_eq!(plane.iou(&plane), 1.0);
        assert!(plane.iou(&person) > 0.0);
    }

    #[test]
    fn test_iou_batch_shape() {
        let a = [BBox::new(0, 0, 10, 10), BBox::new(100, 100, 110, 110)];
        let b = [BBox::new(0, 0, 10, 10)];

        let ious = iou_batch(&a, &b);
        assert_eq!(ious.dim(), (2, 1));
        assert_eq!(ious[[0, 0]], 1.0);
        assert_eq!(ious[[1, 0]], 0.0);
    }
}
