//! IoU tracker: greedy association of detections to persistent identities.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::geometry::BBox;
use crate::tracker::matching::{self, AssignmentResult, Detection, MatchStrategy};
use crate::tracker::track::{Track, TrackIdAllocator};

/// Configuration for the IouTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum IoU for a detection to continue a track
    pub iou_threshold: f64,
    /// Frames a track survives without a match before it is destroyed
    pub max_age: u32,
    /// Matches required before a track is reported
    pub min_hits: u32,
    /// Capacity of each track's box history
    pub history_len: usize,
    pub matching: MatchStrategy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.25,
            max_age: 40,
            min_hits: 2,
            history_len: 30,
            matching: MatchStrategy::Greedy,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_hits == 0 {
            return Err(ConfigError::InvalidMinHits(self.min_hits));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::InvalidIouThreshold(self.iou_threshold));
        }
        Ok(())
    }
}

/// Multi-object tracker without a motion model.
///
/// Feed it one frame of detections at a time, in frame order. Tracks that go
/// unmatched keep their last box until they age out.
#[derive(Debug)]
pub struct IouTracker {
    tracks: Vec<Track>,
    ids: TrackIdAllocator,
    frame_id: u64,
    config: TrackerConfig,
}

impl IouTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            tracks: Vec::new(),
            ids: TrackIdAllocator::new(),
            frame_id: 0,
            config,
        })
    }

    /// Process one frame and return the confirmed tracks.
    ///
    /// Returned order is unspecified.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<Track> {
        self.frame_id += 1;

        if self.tracks.is_empty() {
            for det in &detections {
                self.spawn(det);
            }
            return self.confirmed();
        }

        if detections.is_empty() {
            for track in &mut self.tracks {
                track.mark_missed();
            }
            self.prune();
            return self.confirmed();
        }

        let track_boxes: Vec<BBox> = self.tracks.iter().map(|t| t.bbox).collect();
        let scores = matching::iou_matrix(&detections, &track_boxes);

        let AssignmentResult {
            matches,
            unmatched_detections,
            unmatched_tracks,
        } = match self.config.matching {
            MatchStrategy::Greedy => matching::greedy_assignment(&scores, self.config.iou_threshold),
            MatchStrategy::Optimal => matching::optimal_assignment(&scores, self.config.iou_threshold),
        };

        for (idet, itrack) in matches {
            self.tracks[itrack].update(&detections[idet]);
        }
        for itrack in unmatched_tracks {
            self.tracks[itrack].mark_missed();
        }
        // New tracks go last so the indices above stay valid
        for idet in unmatched_detections {
            self.spawn(&detections[idet]);
        }

        self.prune();
        self.confirmed()
    }

    /// All live tracks, confirmed or not.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of `update` calls so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    fn spawn(&mut self, detection: &Detection) {
        let track_id = self.ids.next_id();
        debug!(track_id, frame = self.frame_id, bbox = ?detection.bbox, "track born");
        self.tracks
            .push(Track::new(track_id, detection, self.config.history_len));
    }

    fn prune(&mut self) {
        let max_age = self.config.max_age;
        let frame = self.frame_id;
        self.tracks.retain(|track| {
            let alive = track.is_alive(max_age);
            if !alive {
                debug!(track_id = track.track_id, hits = track.hits, frame, "track expired");
            }
            alive
        });
    }

    fn confirmed(&self) -> Vec<Track> {
        self.tracks
            .iter()
            .filter(|t| t.is_confirmed(self.config.min_hits))
            .cloned()
            .collect()
    }
}
