mod iou_tracker;
mod matching;
mod track;

pub use iou_tracker::{IouTracker, TrackerConfig};
pub use matching::{
    AssignmentResult, Detection, MatchStrategy, greedy_assignment, iou_matrix, optimal_assignment,
};
pub use track::{Track, TrackId, TrackIdAllocator};
