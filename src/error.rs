//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Invalid geometric input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// A polygon needs at least three vertices to enclose an area.
    #[error("polygon needs at least 3 vertices, got {vertices}")]
    DegeneratePolygon { vertices: usize },
}

/// Invalid or unreadable configuration. Always fatal at construction time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("min_hits must be at least 1, got {0}")]
    InvalidMinHits(u32),

    #[error("iou_threshold must be within [0, 1], got {0}")]
    InvalidIouThreshold(f64),

    #[error("alarm cooldown must be between 0 and 86400 seconds, got {0}")]
    InvalidCooldown(f64),

    #[error("detect_every_n_frames must be at least 1")]
    InvalidFrameStride,

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure while loading or saving the zone document.
#[derive(Debug, Error)]
pub enum ZoneStoreError {
    #[error("failed to read zones from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse zones in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("zone #{index} is invalid: {source}")]
    InvalidZone {
        index: usize,
        #[source]
        source: GeometryError,
    },

    #[error("failed to serialize zones: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write zones to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while loading recorded detections.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to read recording {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path}:{line}: invalid frame: {source}")]
    Parse {
        path: PathBuf,
        /// 1-based line number
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
