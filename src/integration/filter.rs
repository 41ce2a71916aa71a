//! Upstream sanity filtering of detector output.

use serde::{Deserialize, Serialize};

use crate::integration::builder::DetectionBuilder;
use crate::integration::detector::RawDetection;
use crate::tracker::Detection;

/// Drops detections that are unlikely to be a standing person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFilter {
    /// Minimum confidence to keep a detection
    pub confidence_threshold: f32,
    /// Class ID of "person" in the detector's label map
    pub person_class_id: usize,
    /// Minimum box width in pixels
    pub min_width: i32,
    /// Minimum box height in pixels
    pub min_height: i32,
    /// Minimum height / width ratio
    pub min_aspect_ratio: f32,
    /// Maximum height / width ratio
    pub max_aspect_ratio: f32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.35,
            person_class_id: 0,
            min_width: 20,
            min_height: 40,
            min_aspect_ratio: 1.0,
            max_aspect_ratio: 5.0,
        }
    }
}

impl DetectionFilter {
    /// Convert a raw detection, keeping it only if it is a plausible person.
    ///
    /// Detections without a class ID are assumed to be persons already.
    pub fn from_raw(&self, raw: &RawDetection) -> Option<Detection> {
        if raw.class_id.is_some_and(|class| class != self.person_class_id) {
            return None;
        }
        let detection = DetectionBuilder::from(raw).build();
        self.accepts(&detection).then_some(detection)
    }

    /// Apply [`DetectionFilter::from_raw`] to a whole frame.
    pub fn apply(&self, raw: &[RawDetection]) -> Vec<Detection> {
        raw.iter().filter_map(|r| self.from_raw(r)).collect()
    }

    /// Confidence, size and aspect-ratio check. Inverted boxes never pass.
    pub fn accepts(&self, detection: &Detection) -> bool {
        let bbox = &detection.bbox;
        // written so that a NaN score fails
        let confident = detection.score >= self.confidence_threshold;
        if bbox.is_degenerate() || !confident {
            return false;
        }

        let (width, height) = (bbox.width(), bbox.height());
        if width < i64::from(self.min_width) || height < i64::from(self.min_height) {
            return false;
        }

        let aspect = height as f32 / width.max(1) as f32;
        (self.min_aspect_ratio..=self.max_aspect_ratio).contains(&aspect)
    }
}
