//! Restricted zones: containment queries and JSON persistence.

mod index;
mod store;

pub use index::ZoneIndex;
pub use store::{load_zones, save_zones};
