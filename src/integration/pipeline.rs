//! TrackerPipeline for combining detection, tracking and the danger-zone policy.

use serde::Deserialize;

use crate::danger_zone::{DangerZoneClassifier, DangerZoneConfig, Warning};
use crate::error::{PipelineError, TrackerError};
use crate::tracker::{FrameReport, IdentityPool, TrackerConfig, VehicleTracker};

use super::DetectionSource;

/// Everything one camera stream is configured with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub tracker: TrackerConfig,
    pub danger_zone: DangerZoneConfig,
}

/// Result of one processed frame, handed to the renderer.
#[derive(Debug, Clone, Default)]
pub struct StreamReport {
    pub frame: FrameReport,
    pub warning: Warning,
}

/// A per-camera pipeline that bundles detection inference with tracking.
///
/// Each pipeline owns its own track set and identity pool, so pipelines for
/// different cameras share nothing.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: VehicleTracker,
    classifier: DangerZoneClassifier,
}

impl<D> TrackerPipeline<D>
where
    D: DetectionSource,
    D::Error: std::error::Error + 'static,
{
    /// Create a new tracking pipeline with the given detector and stream config.
    pub fn new(detector: D, config: StreamConfig) -> Result<Self, TrackerError> {
        Self::with_identity_pool(detector, config, IdentityPool::unbounded())
    }

    pub fn with_identity_pool(
        detector: D,
        config: StreamConfig,
        pool: IdentityPool,
    ) -> Result<Self, TrackerError> {
        Ok(Self {
            detector,
            tracker: VehicleTracker::with_identity_pool(config.tracker, pool)?,
            classifier: DangerZoneClassifier::new(config.danger_zone),
        })
    }

    /// Process a single frame: detect, update the tracks, classify the visible ones.
    ///
    /// A tracking error skips the frame; the next call continues from the
    /// previous frame's tracks.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<StreamReport, PipelineError<D::Error>> {
        let detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detection)?;
        let frame = self.tracker.update(&detections)?;
        let warning = self.classifier.classify(&frame.visible, width, height);
        Ok(StreamReport { frame, warning })
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &VehicleTracker {
        &self.tracker
    }

    pub fn classifier(&self) -> &DangerZoneClassifier {
        &self.classifier
    }
}
