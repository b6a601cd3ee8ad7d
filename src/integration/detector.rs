//! Detector seam: the trait the pipeline pulls detections from, and the
//! post-processing that turns raw model output into vehicle detections.

use serde::Deserialize;
use tracing::trace;

use crate::tracker::{BBox, Detection};

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any vehicle detector to the tracker.
/// Returned detections must already be filtered; wrap a [`RawDetector`] in a
/// [`FilteredDetector`] to get that from raw model output.
///
/// # Example
///
/// ```ignore
/// use vehicle_tracker_rs::{DetectionSource, Detection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // Run inference and return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data and return detections.
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
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Raw detection output from the model, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Normalized box: [ymin, xmin, ymax, xmax] in [0, 1]
    pub bbox: [f32; 4],
    /// Confidence score
    pub score: f32,
    /// Class ID in the model's label map
    pub class_id: u32,
}

/// Model producing unfiltered detections for a frame.
pub trait RawDetector {
    type Error;

    fn infer(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error>;
}

/// Keeps confident vehicle detections with a plausible shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionFilter {
    /// Scores must be strictly above this
    pub min_confidence: f32,
    /// Label-map class treated as a vehicle (COCO: 3 = car)
    pub vehicle_class: u32,
    /// Maximum height / width ratio
    pub max_aspect_ratio: f32,
    /// Minimum height and width in pixels
    pub min_size: f32,
}

impl Default for DetectionFilter {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            vehicle_class: 3,
            max_aspect_ratio: 0.8,
            min_size: 20.0,
        }
    }
}

impl DetectionFilter {
    /// Filter raw output for a `width` x `height` frame and convert it to pixels.
    pub fn apply(&self, raw: &[RawDetection], width: u32, height: u32) -> Vec<Detection> {
        raw.iter()
            .filter(|d| d.class_id == self.vehicle_class && d.score > self.min_confidence)
            .filter_map(|d| {
                let bbox = BBox::from_normalized(d.bbox, width, height);
                self.accepts_shape(&bbox).then(|| {
                    trace!(?bbox, score = d.score, "vehicle detected");
                    Detection::from_bbox(bbox, d.score)
                })
            })
            .collect()
    }

    fn accepts_shape(&self, bbox: &BBox) -> bool {
        let (h, w) = (bbox.height(), bbox.width());
        h > self.min_size && w > self.min_size && h / w < self.max_aspect_ratio
    }
}

/// A [`RawDetector`] whose output goes through a [`DetectionFilter`].
pub struct FilteredDetector<M: RawDetector> {
    model: M,
    filter: DetectionFilter,
}

impl<M: RawDetector> FilteredDetector<M> {
    pub fn new(model: M, filter: DetectionFilter) -> Self {
        Self { model, filter }
    }

    pub fn filter(&self) -> &DetectionFilter {
        &self.filter
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }
}

impl<M: RawDetector> DetectionSource for FilteredDetector<M> {
    type Error = M::Error;

    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error> {
        let raw = self.model.infer(input, width, height)?;
        Ok(self.filter.apply(&raw, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(bbox: [f32; 4], score: f32, class_id: u32) -> RawDetection {
        RawDetection {
            bbox,
            score,
            class_id,
        }
    }

    #[test]
    fn test_filter_keeps_confident_cars() {
        let filter = DetectionFilter::default();
        let outputs = vec![
            raw([0.5, 0.125, 0.75, 0.5], 0.9, 3),
            // Wrong class
            raw([0.5, 0.125, 0.75, 0.5], 0.9, 1),
            // Score must exceed the threshold
            raw([0.5, 0.125, 0.75, 0.5], 0.6, 3),
        ];
        let dets = filter.apply(&outputs, 1000, 1000);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].bbox, BBox::new(500.0, 125.0, 750.0, 500.0));
        assert_eq!(dets[0].score, 0.9);
    }

    #[test]
    fn test_filter_rejects_bad_shapes() {
        let filter = DetectionFilter::default();
        let outputs = vec![
            // Taller than wide (pedestrian-like)
            raw([0.125, 0.125, 0.5, 0.25], 0.9, 3),
            // Too small
            raw([0.125, 0.125, 0.140625, 0.25], 0.9, 3),
        ];
        assert!(filter.apply(&outputs, 1000, 1000).is_empty());
    }

    struct FixedModel(Vec<RawDetection>);

    impl RawDetector for FixedModel {
        type Error = std::convert::Infallible;

        fn infer(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<RawDetection>, Self::Error> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_filtered_detector() {
        let model = FixedModel(vec![
            raw([0.5, 0.125, 0.75, 0.5], 0.9, 3),
            raw([0.5, 0.125, 0.75, 0.5], 0.3, 3),
        ]);
        let mut detector = FilteredDetector::new(model, DetectionFilter::default());
        let dets = detector.detect(&[], 640, 480).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].bbox, BBox::new(240.0, 80.0, 360.0, 320.0));
    }
}
