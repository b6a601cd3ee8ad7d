//! Matching utilities: detections, the IoU cost matrix and the assignment solver.

use crate::error::TrackerError;
use crate::tracker::bbox::{BBox, iou_batch};
use ndarray::Array2;

/// Detection input for the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding box in pixels
    pub bbox: BBox,
    /// Detection confidence score, already filtered by the detector
    pub score: f32,
}

impl Detection {
    /// Create a detection from `(ymin, xmin, ymax, xmax)` pixel coordinates.
    pub fn new(ymin: f32, xmin: f32, ymax: f32, xmax: f32, score: f32) -> Self {
        Self {
            bbox: BBox::new(ymin, xmin, ymax, xmax),
            score,
        }
    }

    pub fn from_bbox(bbox: BBox, score: f32) -> Self {
        Self { bbox, score }
    }
}

/// Build the track x detection IoU matrix.
///
/// Either side being empty yields an empty matrix; [`linear_assignment`]
/// then reports everything unmatched without running the solver.
pub fn iou_matrix(track_boxes: &[BBox], det_boxes: &[BBox]) -> Array2<f32> {
    iou_batch(track_boxes, det_boxes)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    /// `(track index, detection index)` pairs
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    pub(crate) fn all_unmatched(num_tracks: usize, num_detections: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_tracks).collect(),
            unmatched_detections: (0..num_detections).collect(),
        }
    }
}

/// Cost of a padded (dummy) cell: the same as a pair with no overlap.
const PAD_COST: f64 = 1.0;

/// Optimal track/detection assignment maximizing total IoU.
///
/// The Jonker-Volgenant solver runs on `1 - IoU` over the whole matrix.
/// Matched pairs whose IoU does not exceed `min_iou` are split afterwards and
/// both sides reported unmatched, so the gate never changes which pairs the
/// solver considers.
pub fn linear_assignment(
    iou_matrix: &Array2<f32>,
    min_iou: f32,
) -> Result<AssignmentResult, TrackerError> {
    let (num_rows, num_cols) = iou_matrix.dim();

    if num_rows == 0 || num_cols == 0 {
        return Ok(AssignmentResult::all_unmatched(num_rows, num_cols));
    }

    // Every pair would be gated out anyway.
    if iou_matrix.iter().all(|&iou| iou <= min_iou) {
        return Ok(AssignmentResult::all_unmatched(num_rows, num_cols));
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), PAD_COST);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = 1.0 - iou_matrix[[i, j]] as f64;
        }
    }

    let (row_to_col, _) =
        lapjv::lapjv(&padded).map_err(|e| TrackerError::Assignment(format!("{e:?}")))?;

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
        if col_idx >= num_cols {
            unmatched_tracks.push(row_idx);
        } else if iou_matrix[[row_idx, col_idx]] > min_iou {
            matches.push((row_idx, col_idx));
            unmatched_detections_mask[col_idx] = false;
        } else {
            unmatched_tracks.push(row_idx);
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    Ok(AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    })
}
