//! Person tracking and restricted-zone intrusion alarms.
//!
//! Per frame, detections go through the [`IouTracker`], each confirmed
//! track's feet are tested against the [`ZoneIndex`], and the resulting
//! intruder set drives the debounced [`AlarmController`].

pub mod alarm;
pub mod config;
pub mod error;
pub mod geometry;
pub mod integration;
pub mod monitor;
pub mod tracker;
pub mod zone;

pub use alarm::{AlarmConfig, AlarmController, AlarmEvent, AlarmState, AlarmStatus};
pub use config::Settings;
pub use error::{ConfigError, GeometryError, RecordingError, ZoneStoreError};
pub use geometry::{BBox, Point, Polygon, point_in_polygon};
pub use integration::{
    DetectionBuilder, DetectionFilter, DetectionSource, IntrusionPipeline, RawDetection,
    RecordedDetections,
};
pub use monitor::{FrameReport, IntrusionMonitor};
pub use tracker::{Detection, IouTracker, MatchStrategy, Track, TrackId, TrackerConfig};
pub use zone::ZoneIndex;
