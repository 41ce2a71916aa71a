//! Matching utilities for multi-object tracking.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{BBox, iou_batch};

/// Detection input for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box in TLBR format (x1, y1, x2, y2)
    pub bbox: BBox,
    /// Detection confidence score in `[0, 1]`
    pub score: f32,
}

impl Detection {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, score: f32) -> Self {
        Self {
            bbox: BBox::new(x1, y1, x2, y2),
            score,
        }
    }

    pub fn from_bbox(bbox: BBox, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// How detections are assigned to existing tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Repeatedly commit the highest remaining IoU pair.
    #[default]
    Greedy,
    /// Minimum total `1 - IoU` cost assignment (LAPJV).
    Optimal,
}

/// Score written over a consumed row/column; below every valid threshold.
const CONSUMED: f64 = -1.0;

/// Cost of a padding cell in the square LAPJV matrix.
const PADDING_COST: f64 = 1e6;

/// Dense detection x track IoU matrix (rows are detections).
pub fn iou_matrix(detections: &[Detection], track_boxes: &[BBox]) -> Array2<f64> {
    let det_boxes: Vec<BBox> = detections.iter().map(|d| d.bbox).collect();
    iou_batch(&det_boxes, track_boxes)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    /// Committed `(detection, track)` index pairs, in commit order
    pub matches: Vec<(usize, usize)>,
    pub unmatched_detections: Vec<usize>,
    pub unmatched_tracks: Vec<usize>,
}

impl AssignmentResult {
    fn from_matches(matches: Vec<(usize, usize)>, num_detections: usize, num_tracks: usize) -> Self {
        let mut det_matched = vec![false; num_detections];
        let mut track_matched = vec![false; num_tracks];
        for &(det, track) in &matches {
            det_matched[det] = true;
            track_matched[track] = true;
        }

        let unmatched = |mask: Vec<bool>| -> Vec<usize> {
            mask.iter()
                .enumerate()
                .filter_map(|(i, &m)| if m { None } else { Some(i) })
                .collect()
        };

        Self {
            matches,
            unmatched_detections: unmatched(det_matched),
            unmatched_tracks: unmatched(track_matched),
        }
    }
}

/// Greedy maximum-IoU assignment.
///
/// Picks the global maximum of `scores` until it falls below `threshold`.
/// Ties go to the first cell in row-major order, so identical inputs always
/// produce identical matches. Not globally optimal.
pub fn greedy_assignment(scores: &Array2<f64>, threshold: f64) -> AssignmentResult {
    let (num_rows, num_cols) = scores.dim();
    let mut remaining = scores.clone();
    let mut matches = Vec::new();

    while matches.len() < num_rows.min(num_cols) {
        let Some((best, (row, col))) = argmax(&remaining) else {
            break;
        };
        if best < threshold {
            break;
        }

        matches.push((row, col));
        remaining.row_mut(row).fill(CONSUMED);
        remaining.column_mut(col).fill(CONSUMED);
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

/// Optimal assignment over `1 - IoU` costs using LAPJV.
///
/// Pairs whose IoU is below `threshold` are discarded after solving.
/// Falls back to [`greedy_assignment`] if the solver fails.
pub fn optimal_assignment(scores: &Array2<f64>, threshold: f64) -> AssignmentResult {
    let (num_rows, num_cols) = scores.dim();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::from_matches(Vec::new(), num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), PADDING_COST);
    for ((i, j), &score) in scores.indexed_iter() {
        padded[[i, j]] = 1.0 - score;
    }

    let Ok((row_to_col, _)) = lapjv::lapjv(&padded) else {
        warn!(
            rows = num_rows,
            cols = num_cols,
            "LAPJV failed, falling back to greedy assignment"
        );
        return greedy_assignment(scores, threshold);
    };

    let matches = row_to_col
        .iter()
        .enumerate()
        .filter(|&(row, &col)| row < num_rows && col < num_cols && scores[[row, col]] >= threshold)
        .map(|(row, &col)| (row, col))
        .collect();

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

// First occurrence wins on ties; ndarray iterates in logical row-major order.
fn argmax(scores: &Array2<f64>) -> Option<(f64, (usize, usize))> {
    let mut best: Option<(f64, (usize, usize))> = None;
    for (idx, &score) in scores.indexed_iter() {
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, idx));
        }
    }
    best
}
