//! Builder for creating Detection objects from various input formats.

use crate::tracker::{BBox, Detection};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: BBox,
    score: f32,
}

impl DetectionBuilder {
    /// Create a new detection builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = BBox::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box as (ymin, xmin, ymax, xmax) pixels.
    pub fn yxyx(mut self, ymin: f32, xmin: f32, ymax: f32, xmax: f32) -> Self {
        self.bbox = BBox::new(ymin, xmin, ymax, xmax);
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = BBox::new(cy - h / 2.0, cx - w / 2.0, cy + h / 2.0, cx + w / 2.0);
        self
    }

    /// Set bounding box from normalized (ymin, xmin, ymax, xmax) scaled to the frame.
    pub fn normalized(mut self, bbox: [f32; 4], width: u32, height: u32) -> Self {
        self.bbox = BBox::from_normalized(bbox, width, height);
        self
    }

    /// Set the confidence score.
    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Build the final `Detection`.
    pub fn build(self) -> Detection {
        Detection::from_bbox(self.bbox, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10.0, 20.0, 50.0, 80.0)
            .score(0.95)
            .build();

        assert_eq!(det.score, 0.95);
        assert_eq!(det.bbox, BBox::new(20.0, 10.0, 80.0, 50.0));
    }

    #[test]
    fn test_xywh_and_normalized() {
        let det = DetectionBuilder::new().xywh(50.0, 40.0, 20.0, 10.0).build();
        assert_eq!(det.bbox, BBox::new(35.0, 40.0, 45.0, 60.0));

        let det = DetectionBuilder::new()
            .normalized([0.5, 0.25, 1.0, 0.75], 640, 480)
            .build();
        assert_eq!(det.bbox, BBox::new(240.0, 160.0, 480.0, 480.0));
    }
}
