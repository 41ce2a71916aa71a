//! Zone document persistence.
//!
//! ```json
//! { "zones": [ { "id": 0, "points": [ { "x": 10, "y": 20 }, ... ] } ] }
//! ```
//!
//! Points written as `[x, y]` pairs are accepted on load as well.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ZoneStoreError;
use crate::geometry::{Point, Polygon};

#[derive(Debug, Serialize, Deserialize)]
struct ZoneDocument {
    #[serde(default)]
    zones: Vec<ZoneRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ZoneRecord {
    #[serde(default)]
    id: usize,
    points: Vec<PointRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PointRecord {
    Object { x: i32, y: i32 },
    Pair([i32; 2]),
}

impl From<PointRecord> for Point {
    fn from(record: PointRecord) -> Self {
        match record {
            PointRecord::Object { x, y } => Point::new(x, y),
            PointRecord::Pair([x, y]) => Point::new(x, y),
        }
    }
}

/// Load zones from `path`.
///
/// A missing file is not an error: it is logged and yields no zones.
/// Every zone must have at least three vertices.
pub fn load_zones(path: impl AsRef<Path>) -> Result<Vec<Polygon>, ZoneStoreError> {
    let path = path.as_ref();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "no zones file found, starting with zero zones");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ZoneStoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let document: ZoneDocument =
        serde_json::from_str(&raw).map_err(|source| ZoneStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let zones = document
        .zones
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let vertices = record.points.into_iter().map(Point::from).collect();
            Polygon::new(vertices).map_err(|source| ZoneStoreError::InvalidZone { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(path = %path.display(), count = zones.len(), "loaded zones");
    Ok(zones)
}

/// Save zones to `path` as pretty-printed JSON.
///
/// Writes a sibling temporary file and renames it into place, so a failure
/// never leaves a truncated document behind.
pub fn save_zones(path: impl AsRef<Path>, zones: &[Polygon]) -> Result<(), ZoneStoreError> {
    let path = path.as_ref();

    let document = ZoneDocument {
        zones: zones
            .iter()
            .enumerate()
            .map(|(id, zone)| ZoneRecord {
                id,
                points: zone
                    .vertices()
                    .iter()
                    .map(|p| PointRecord::Object { x: p.x, y: p.y })
                    .collect(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&document)?;

    let tmp = temp_path(path);
    let write_err = |source| ZoneStoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(err));
    }

    info!(path = %path.display(), count = zones.len(), "saved zones");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
