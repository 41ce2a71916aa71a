//! Detector seam: anything that turns a frame into person candidates.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RecordingError;

/// Unfiltered detector output for one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Box in TLBR format: [x1, y1, x2, y2], in frame pixels
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Class ID, if the model is multi-class
    #[serde(default)]
    pub class_id: Option<usize>,
}

impl RawDetection {
    pub fn new(bbox: [f32; 4], score: f32, class_id: Option<usize>) -> Self {
        Self {
            bbox,
            score,
            class_id,
        }
    }
}

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any person detector to the pipeline. The
/// pipeline filters the output, so implementations may return every class.
///
/// # Example
///
/// ```ignore
/// use intrusion_rs::{DetectionSource, RawDetection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<RawDetection>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error>;
}

/// One line of a JSON Lines recording. Unknown keys such as `frame` are ignored.
#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    detections: Vec<RawDetection>,
}

/// Plays back detections recorded earlier, one frame per `detect` call.
///
/// Ignores the image arguments. Once exhausted every call returns no
/// detections.
#[derive(Debug, Clone, Default)]
pub struct RecordedDetections {
    frames: VecDeque<Vec<RawDetection>>,
}

impl RecordedDetections {
    pub fn new(frames: impl IntoIterator<Item = Vec<RawDetection>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Load a JSON Lines recording, one detector run per line:
    ///
    /// ```json
    /// {"detections": [{"bbox": [412.0, 80.5, 470.2, 260.0], "score": 0.82, "class_id": 0}]}
    /// ```
    ///
    /// Blank lines are skipped.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let path = path.as_ref();
        let read_err = |source| RecordingError::Read {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(read_err)?;
        let mut frames = VecDeque::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(read_err)?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame =
                serde_json::from_str(&line).map_err(|source| RecordingError::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                })?;
            frames.push_back(frame.detections);
        }

        debug!(path = %path.display(), frames = frames.len(), "loaded recording");
        Ok(Self { frames })
    }

    /// Frames not yet played back.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl DetectionSource for RecordedDetections {
    type Error = Infallible;

    fn detect(
        &mut self,
        _input: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error> {
        Ok(self.frames.pop_front().unwrap_or_default())
    }
}
