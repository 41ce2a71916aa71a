//! Per-frame orchestration: tracker, then zones, then alarm.

use std::collections::BTreeSet;
use std::time::Instant;

use serde::Serialize;

use crate::alarm::{AlarmController, AlarmEvent, AlarmStatus};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::tracker::{Detection, IouTracker, Track, TrackId, TrackerConfig};
use crate::zone::ZoneIndex;

/// Read-only snapshot of one processed frame, for renderers and logs.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    /// 1-based frame counter
    pub frame_index: u64,
    /// Whether the tracker ran on this frame
    pub detected: bool,
    /// Confirmed tracks
    pub tracks: Vec<Track>,
    /// Confirmed tracks standing inside a zone on this frame
    pub intruders: BTreeSet<TrackId>,
    pub alarm: AlarmStatus,
    /// Alarm transition caused by this frame, if any
    pub event: Option<AlarmEvent>,
}

impl FrameReport {
    pub fn is_intruding(&self, track_id: TrackId) -> bool {
        self.intruders.contains(&track_id)
    }
}

/// Tracking-and-intrusion engine for a single video stream.
#[derive(Debug)]
pub struct IntrusionMonitor {
    tracker: IouTracker,
    zones: ZoneIndex,
    alarm: AlarmController,
    frame_index: u64,
}

impl IntrusionMonitor {
    pub fn new(
        tracker_config: TrackerConfig,
        zones: ZoneIndex,
        alarm: AlarmController,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            tracker: IouTracker::new(tracker_config)?,
            zones,
            alarm,
            frame_index: 0,
        })
    }

    pub fn from_settings(settings: &Settings, zones: ZoneIndex) -> Result<Self, ConfigError> {
        settings.validate()?;
        let alarm = AlarmController::from_config(&settings.alarm)?;
        Self::new(settings.tracker.clone(), zones, alarm)
    }

    /// Process one frame of detections using the monotonic clock.
    pub fn observe(&mut self, detections: Vec<Detection>) -> FrameReport {
        self.observe_at(detections, Instant::now())
    }

    /// Process one frame of detections at `now`.
    pub fn observe_at(&mut self, detections: Vec<Detection>, now: Instant) -> FrameReport {
        let tracks = self.tracker.update(detections);
        self.evaluate(tracks, true, now)
    }

    /// Re-run zone and alarm evaluation on tracks from an earlier frame,
    /// without advancing the tracker. Used for frames where detection is skipped.
    pub fn reevaluate_at(&mut self, tracks: Vec<Track>, now: Instant) -> FrameReport {
        self.evaluate(tracks, false, now)
    }

    fn evaluate(&mut self, tracks: Vec<Track>, detected: bool, now: Instant) -> FrameReport {
        self.frame_index += 1;

        let intruders: BTreeSet<TrackId> = tracks
            .iter()
            .filter(|t| self.zones.contains_any(t.reference_point()))
            .map(|t| t.track_id)
            .collect();
        let (alarm, event) = self.alarm.update_at(&intruders, now);

        FrameReport {
            frame_index: self.frame_index,
            detected,
            tracks,
            intruders,
            alarm,
            event,
        }
    }

    pub fn zones(&self) -> &ZoneIndex {
        &self.zones
    }

    /// Zone edits belong to the setup phase, between frames.
    pub fn zones_mut(&mut self) -> &mut ZoneIndex {
        &mut self.zones
    }

    pub fn tracker(&self) -> &IouTracker {
        &self.tracker
    }

    pub fn alarm(&self) -> &AlarmController {
        &self.alarm
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geometry::Polygon;

    fn monitor() -> IntrusionMonitor {
        // zone covers x in [200, 400], y in [0, 300]
        let zone = Polygon::from_coords(&[(200, 0), (400, 0), (400, 300), (200, 300)]).unwrap();
        IntrusionMonitor::new(
            TrackerConfig {
                min_hits: 2,
                ..TrackerConfig::default()
            },
            ZoneIndex::new(vec![zone]),
            AlarmController::new(Duration::from_secs(3)),
        )
        .unwrap()
    }

    // 40x100 person whose feet are at (x + 20, 250)
    fn person(x: i32) -> Detection {
        Detection::new(x, 150, x + 40, 250, 0.9)
    }

    #[test]
    fn test_unconfirmed_track_does_not_raise() {
        let mut monitor = monitor();
        let report = monitor.observe_at(vec![person(280)], Instant::now());

        assert!(report.tracks.is_empty());
        assert!(report.intruders.is_empty());
        assert!(!report.alarm.active);
    }

    #[test]
    fn test_confirmed_intruder_raises() {
        let t0 = Instant::now();
        let mut monitor = monitor();
        monitor.observe_at(vec![person(280), person(0)], t0);
        let report = monitor.observe_at(vec![person(282), person(2)], t0);

        assert_eq!(report.tracks.len(), 2);
        assert_eq!(report.intruders, BTreeSet::from([1]));
        assert!(report.is_intruding(1));
        assert!(!report.is_intruding(2));
        assert!(report.alarm.active);
        assert_eq!(report.event, Some(AlarmEvent::Raised));
        assert_eq!(report.frame_index, 2);
    }

    #[test]
    fn test_uses_feet_not_center() {
        let t0 = Instant::now();
        let mut monitor = monitor();
        // box straddles the zone's bottom edge: center inside, feet below it
        let tall = Detection::new(280, 200, 320, 380, 0.9);
        monitor.observe_at(vec![tall], t0);
        let report = monitor.observe_at(vec![tall], t0);

        assert_eq!(report.tracks.len(), 1);
        assert!(report.intruders.is_empty());
    }

    #[test]
    fn test_reevaluate_does_not_touch_tracker() {
        let t0 = Instant::now();
        let mut monitor = monitor();
        monitor.observe_at(vec![person(280)], t0);
        let report = monitor.observe_at(vec![person(280)], t0);

        let cached = report.tracks.clone();
        let skipped = monitor.reevaluate_at(cached, t0 + Duration::from_millis(30));
        assert!(!skipped.detected);
        assert_eq!(skipped.intruders, BTreeSet::from([1]));
        assert_eq!(monitor.tracker().frame_id(), 2);
        assert_eq!(monitor.frame_index(), 3);
    }

    #[test]
    fn test_zones_can_be_replaced_between_frames() {
        let t0 = Instant::now();
        let mut monitor = monitor();
        monitor.zones_mut().replace_all(Vec::new());
        monitor.observe_at(vec![person(280)], t0);
        let report = monitor.observe_at(vec![person(280)], t0);

        assert!(monitor.zones().is_empty());
        assert!(report.intruders.is_empty());
        assert!(!monitor.alarm().is_active());
    }
}
