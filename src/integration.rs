//! Integration module for connecting person detectors to the intrusion engine.
//!
//! A [`DetectionSource`] produces raw detections, a [`DetectionFilter`] keeps
//! plausible persons, and [`IntrusionPipeline`] drives the tracker, zones and
//! alarm frame by frame.

mod builder;
mod detector;
mod filter;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, RawDetection, RecordedDetections};
pub use filter::DetectionFilter;
pub use pipeline::IntrusionPipeline;
