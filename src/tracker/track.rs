//! Single followed person and the id allocator that names it.

use std::collections::VecDeque;

use serde::Serialize;

use crate::geometry::{BBox, Point, reference_point};
use crate::tracker::matching::Detection;

/// Track identifier. Positive, never reused within one tracker.
pub type TrackId = u64;

/// Hands out monotonically increasing track ids starting at 1.
///
/// Each tracker owns its own allocator, so two trackers never share state.
#[derive(Debug, Clone, Default)]
pub struct TrackIdAllocator {
    last: TrackId,
}

impl TrackIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the next unique track ID.
    pub fn next_id(&mut self) -> TrackId {
        self.last += 1;
        self.last
    }

    /// Most recently issued id, if any.
    pub fn last_issued(&self) -> Option<TrackId> {
        (self.last > 0).then_some(self.last)
    }
}

/// Single object track.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    /// Unique track identifier
    pub track_id: TrackId,
    /// Last matched box; unchanged while the track is missing
    pub bbox: BBox,
    /// Confidence of the last matched detection
    pub score: f32,
    /// Consecutive frames since the last match
    pub age: u32,
    /// Number of detections ever matched, including the one that created it
    pub hits: u32,
    /// Recent matched boxes, oldest first
    #[serde(skip)]
    pub history: VecDeque<BBox>,
    #[serde(skip)]
    history_len: usize,
}

impl Track {
    /// Start a track from an unmatched detection.
    pub(crate) fn new(track_id: TrackId, detection: &Detection, history_len: usize) -> Self {
        let mut track = Self {
            track_id,
            bbox: detection.bbox,
            score: detection.score,
            age: 0,
            hits: 1,
            history: VecDeque::with_capacity(history_len),
            history_len,
        };
        track.push_history(detection.bbox);
        track
    }

    /// Apply a matched detection.
    pub(crate) fn update(&mut self, detection: &Detection) {
        self.bbox = detection.bbox;
        self.score = detection.score;
        self.hits += 1;
        self.age = 0;
        self.push_history(detection.bbox);
    }

    /// Record a frame without a match. The box is kept as-is.
    pub(crate) fn mark_missed(&mut self) {
        self.age += 1;
    }

    pub fn is_confirmed(&self, min_hits: u32) -> bool {
        self.hits >= min_hits
    }

    pub fn is_alive(&self, max_age: u32) -> bool {
        self.age <= max_age
    }

    /// Bottom-center of the current box.
    pub fn reference_point(&self) -> Point {
        reference_point(&self.bbox)
    }

    fn push_history(&mut self, bbox: BBox) {
        if self.history_len == 0 {
            return;
        }
        if self.history.len() == self.history_len {
            self.history.pop_front();
        }
        self.history.push_back(bbox);
    }
}
