//! Two forward-facing cameras, one on each side of the vehicle.

use crate::danger_zone::{CameraOrientation, MountSide};
use crate::error::{PipelineError, TrackerError};

use super::pipeline::{StreamConfig, StreamReport, TrackerPipeline};
use super::DetectionSource;

/// A frame from one camera: raw bytes plus dimensions.
#[derive(Debug, Clone, Copy)]
pub struct CameraFrame<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
}

#[derive(Debug)]
pub struct DualReport<LE, RE>
where
    LE: std::error::Error + 'static,
    RE: std::error::Error + 'static,
{
    pub left: Result<StreamReport, PipelineError<LE>>,
    pub right: Result<StreamReport, PipelineError<RE>>,
}

impl<LE, RE> DualReport<LE, RE>
where
    LE: std::error::Error + 'static,
    RE: std::error::Error + 'static,
{
    /// True when neither side raised a warning. A failed side counts as unsafe.
    pub fn safe(&self) -> bool {
        let quiet = |side: Option<&StreamReport>| side.is_some_and(|r| !r.warning.active);
        quiet(self.left.as_ref().ok()) && quiet(self.right.as_ref().ok())
    }
}

/// Left- and right-mounted pipelines processed side by side.
///
/// The two streams keep separate track sets and identity pools and are
/// updated in parallel with `rayon::join`.
pub struct DualCameraMonitor<L: DetectionSource, R: DetectionSource> {
    left: TrackerPipeline<L>,
    right: TrackerPipeline<R>,
}

impl<L, R> DualCameraMonitor<L, R>
where
    L: DetectionSource + Send,
    R: DetectionSource + Send,
    L::Error: std::error::Error + Send + 'static,
    R::Error: std::error::Error + Send + 'static,
{
    /// Build both pipelines; the orientation in `config` is overridden per side.
    pub fn new(left: L, right: R, config: StreamConfig) -> Result<Self, TrackerError> {
        let side_config = |side| {
            let mut config = config.clone();
            config.danger_zone.orientation = CameraOrientation::Forward(side);
            config
        };
        Ok(Self {
            left: TrackerPipeline::new(left, side_config(MountSide::Left))?,
            right: TrackerPipeline::new(right, side_config(MountSide::Right))?,
        })
    }

    pub fn process(
        &mut self,
        left: CameraFrame<'_>,
        right: CameraFrame<'_>,
    ) -> DualReport<L::Error, R::Error> {
        let (left_pipeline, right_pipeline) = (&mut self.left, &mut self.right);
        let (left, right) = rayon::join(
            || left_pipeline.process_frame(left.data, left.width, left.height),
            || right_pipeline.process_frame(right.data, right.width, right.height),
        );
        DualReport { left, right }
    }

    pub fn left(&self) -> &TrackerPipeline<L> {
        &self.left
    }

    pub fn right(&self) -> &TrackerPipeline<R> {
        &self.right
    }
}
