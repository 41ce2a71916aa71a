//! IntrusionPipeline for combining detection with tracking and alarms.

use std::time::Instant;

use crate::config::Settings;
use crate::error::ConfigError;
use crate::integration::{DetectionFilter, DetectionSource};
use crate::monitor::{FrameReport, IntrusionMonitor};
use crate::tracker::Track;
use crate::zone::ZoneIndex;

/// End-to-end processing for one video stream.
///
/// Runs the detector on every `detect_every_n_frames`-th frame, starting with
/// the first. In between, the last confirmed tracks are re-checked against
/// the zones so the alarm keeps running on wall-clock time.
pub struct IntrusionPipeline<D: DetectionSource> {
    detector: D,
    filter: DetectionFilter,
    monitor: IntrusionMonitor,
    detect_every_n_frames: u32,
    frames_seen: u64,
    last_tracks: Vec<Track>,
}

impl<D: DetectionSource> IntrusionPipeline<D> {
    pub fn new(detector: D, settings: &Settings, zones: ZoneIndex) -> Result<Self, ConfigError> {
        let monitor = IntrusionMonitor::from_settings(settings, zones)?;
        Ok(Self {
            detector,
            filter: settings.detector.clone(),
            monitor,
            detect_every_n_frames: settings.pipeline.detect_every_n_frames,
            frames_seen: 0,
            last_tracks: Vec::new(),
        })
    }

    /// Create a pipeline with default settings.
    pub fn with_default_settings(detector: D, zones: ZoneIndex) -> Result<Self, ConfigError> {
        Self::new(detector, &Settings::default(), zones)
    }

    /// Process a single frame using the monotonic clock.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<FrameReport, D::Error> {
        self.process_frame_at(input, width, height, Instant::now())
    }

    /// Process a single frame at `now`.
    ///
    /// On a detection error no state changes, so the caller may retry or skip
    /// the frame.
    pub fn process_frame_at(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        now: Instant,
    ) -> Result<FrameReport, D::Error> {
        if !self.should_detect() {
            self.frames_seen += 1;
            return Ok(self.monitor.reevaluate_at(self.last_tracks.clone(), now));
        }

        let raw = self.detector.detect(input, width, height)?;
        self.frames_seen += 1;

        let detections = self.filter.apply(&raw);
        let report = self.monitor.observe_at(detections, now);
        self.last_tracks.clone_from(&report.tracks);
        Ok(report)
    }

    fn should_detect(&self) -> bool {
        self.frames_seen % u64::from(self.detect_every_n_frames) == 0
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn monitor(&self) -> &IntrusionMonitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut IntrusionMonitor {
        &mut self.monitor
    }

    pub fn filter(&self) -> &DetectionFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::alarm::AlarmEvent;
    use crate::config::PipelineConfig;
    use crate::geometry::Polygon;
    use crate::integration::{RawDetection, RecordedDetections};

    struct FailingDetector;

    impl DetectionSource for FailingDetector {
        type Error = String;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<RawDetection>, Self::Error> {
            Err("camera unplugged".to_string())
        }
    }

    fn zones() -> ZoneIndex {
        ZoneIndex::new(vec![
            Polygon::from_coords(&[(200, 0), (400, 0), (400, 300), (200, 300)]).unwrap(),
        ])
    }

    // feet at (x + 20, 250)
    fn person(x: f32) -> RawDetection {
        RawDetection::new([x, 150.0, x + 40.0, 250.0], 0.9, Some(0))
    }

    fn settings(stride: u32) -> Settings {
        Settings {
            pipeline: PipelineConfig {
                detect_every_n_frames: stride,
            },
            ..Settings::default()
        }
    }

    #[test]
    fn test_pipeline_raises_alarm() {
        let frames = [vec![person(280.0)], vec![person(281.0)], vec![]];
        let source = RecordedDetections::new(frames);
        let mut pipeline = IntrusionPipeline::new(source, &settings(1), zones()).unwrap();
        let t0 = Instant::now();

        let first = pipeline.process_frame_at(&[], 640, 480, t0).unwrap();
        assert!(first.tracks.is_empty());

        let second = pipeline.process_frame_at(&[], 640, 480, t0).unwrap();
        assert_eq!(second.event, Some(AlarmEvent::Raised));

        let third = pipeline
            .process_frame_at(&[], 640, 480, t0 + Duration::from_secs(1))
            .unwrap();
        // the track is still alive with its last box, so it still intrudes
        assert!(third.intruders.contains(&1));
        assert!(third.alarm.active);
        assert!(pipeline.detector().is_exhausted());
    }

    #[test]
    fn test_skipped_frames_reuse_tracks() {
        let frames = [vec![person(280.0)], vec![person(281.0)], vec![person(282.0)]];
        let source = RecordedDetections::new(frames);
        let mut pipeline = IntrusionPipeline::new(source, &settings(2), zones()).unwrap();
        let t0 = Instant::now();

        let reports: Vec<FrameReport> = (0..4)
            .map(|_| pipeline.process_frame_at(&[], 640, 480, t0).unwrap())
            .collect();

        let detected: Vec<bool> = reports.iter().map(|r| r.detected).collect();
        assert_eq!(detected, vec![true, false, true, false]);
        // frames 1 and 3 consumed two recorded frames
        assert_eq!(pipeline.detector().remaining(), 1);
        // confirmed on the second detection, then carried into the skipped frame
        assert_eq!(reports[2].tracks.len(), 1);
        assert_eq!(reports[3].tracks.len(), 1);
        assert!(reports[3].alarm.active);
        assert_eq!(pipeline.monitor().tracker().frame_id(), 2);
    }

    #[test]
    fn test_filter_runs_before_tracker() {
        let tiny = RawDetection::new([280.0, 240.0, 285.0, 250.0], 0.9, Some(0));
        let car = RawDetection::new([280.0, 150.0, 320.0, 250.0], 0.9, Some(2));
        let source = RecordedDetections::new([vec![tiny, car], vec![tiny, car]]);
        let mut pipeline = IntrusionPipeline::new(source, &settings(1), zones()).unwrap();

        pipeline.process_frame(&[], 640, 480).unwrap();
        let report = pipeline.process_frame(&[], 640, 480).unwrap();
        assert!(report.tracks.is_empty());
        assert!(pipeline.monitor().tracker().tracks().is_empty());
    }

    #[test]
    fn test_detector_error_leaves_state_untouched() {
        let mut pipeline = IntrusionPipeline::with_default_settings(FailingDetector, zones()).unwrap();

        let err = pipeline.process_frame(&[], 640, 480).unwrap_err();
        assert_eq!(err, "camera unplugged");
        assert_eq!(pipeline.monitor().frame_index(), 0);
    }

    #[test]
    fn test_rejects_zero_stride() {
        let source = RecordedDetections::default();
        assert!(matches!(
            IntrusionPipeline::new(source, &settings(0), zones()),
            Err(ConfigError::InvalidFrameStride)
        ));
    }
}
