use std::path::Path;

use tracing::info;

use crate::error::ZoneStoreError;
use crate::geometry::{Point, Polygon};
use crate::zone::store::load_zones;

/// Set of restricted zones, queried as a union.
///
/// Edits take `&mut self`, so they cannot interleave with queries.
#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    zones: Vec<Polygon>,
}

impl ZoneIndex {
    pub fn new(zones: Vec<Polygon>) -> Self {
        Self { zones }
    }

    /// Load zones from a JSON document. A missing file yields an empty index.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ZoneStoreError> {
        load_zones(path).map(Self::new)
    }

    /// True if `point` lies inside at least one zone.
    pub fn contains_any(&self, point: Point) -> bool {
        self.zones.iter().any(|zone| zone.contains(point))
    }

    /// Index of the first zone containing `point`.
    pub fn first_containing(&self, point: Point) -> Option<usize> {
        self.zones.iter().position(|zone| zone.contains(point))
    }

    pub fn add_zone(&mut self, zone: Polygon) {
        self.zones.push(zone);
    }

    pub fn replace_all(&mut self, zones: Vec<Polygon>) {
        self.zones = zones;
    }

    /// Replace the zones with the contents of `path`.
    ///
    /// On error the current zones are left untouched.
    pub fn reload(&mut self, path: impl AsRef<Path>) -> Result<usize, ZoneStoreError> {
        let zones = load_zones(path.as_ref())?;
        info!(path = %path.as_ref().display(), count = zones.len(), "zones reloaded");
        self.replace_all(zones);
        Ok(self.zones.len())
    }

    pub fn zones(&self) -> &[Polygon] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl From<Vec<Polygon>> for ZoneIndex {
    fn from(zones: Vec<Polygon>) -> Self {
        Self::new(zones)
    }
}
