//! Conversion of detector-space boxes into integer frame-pixel detections.

use crate::geometry::BBox;
use crate::integration::detector::RawDetection;
use crate::tracker::Detection;

/// Builds a [`Detection`] from floating-point detector output.
///
/// Models often run on a resized copy of the frame; [`scale`](Self::scale)
/// maps their coordinates back onto the original resolution. Fractional
/// coordinates are truncated toward zero after scaling.
#[derive(Debug, Clone)]
pub struct DetectionBuilder {
    corners: [f32; 4],
    scale: (f32, f32),
    score: f32,
}

impl Default for DetectionBuilder {
    fn default() -> Self {
        Self {
            corners: [0.0; 4],
            scale: (1.0, 1.0),
            score: 0.0,
        }
    }
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box given as corners (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.corners = [x1, y1, x2, y2];
        self
    }

    /// Box given as center, width and height, the usual YOLO head layout.
    pub fn xywh(self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        let (hw, hh) = (w / 2.0, h / 2.0);
        self.tlbr(cx - hw, cy - hh, cx + hw, cy + hh)
    }

    /// Box given as top-left corner, width and height.
    pub fn tlwh(self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.tlbr(x, y, x + w, y + h)
    }

    /// Multiply x coordinates by `sx` and y coordinates by `sy`.
    pub fn scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = (sx, sy);
        self
    }

    /// Map from a `model_width` x `model_height` input back to a
    /// `frame_width` x `frame_height` frame.
    pub fn rescale_from(
        self,
        (model_width, model_height): (u32, u32),
        (frame_width, frame_height): (u32, u32),
    ) -> Self {
        if model_width == 0 || model_height == 0 {
            return self;
        }
        self.scale(
            frame_width as f32 / model_width as f32,
            frame_height as f32 / model_height as f32,
        )
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn build(self) -> Detection {
        let [x1, y1, x2, y2] = self.corners;
        let (sx, sy) = self.scale;
        // `as` saturates on overflow and maps NaN to 0
        let bbox = BBox::new(
            (x1 * sx) as i32,
            (y1 * sy) as i32,
            (x2 * sx) as i32,
            (y2 * sy) as i32,
        );
        Detection::from_bbox(bbox, self.score)
    }
}

impl From<&RawDetection> for DetectionBuilder {
    fn from(raw: &RawDetection) -> Self {
        let [x1, y1, x2, y2] = raw.bbox;
        Self::new().tlbr(x1, y1, x2, y2).score(raw.score)
    }
}
