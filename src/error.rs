//! Error types for the tracker core and the detection pipeline.

use thiserror::Error;

use crate::tracker::TrackId;

/// Errors raised while updating a [`VehicleTracker`](crate::VehicleTracker).
///
/// A frame that fails with one of these leaves the track set untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// A bounded identity pool ran out of labels.
    #[error("identity pool exhausted: all {capacity} identities are in use")]
    IdentityPoolExhausted { capacity: usize },

    /// The innovation covariance of a track could not be inverted.
    #[error("innovation covariance of track {track_id} is singular")]
    SingularInnovation { track_id: TrackId },

    /// The assignment solver rejected the cost matrix.
    #[error("assignment solver failed: {0}")]
    Assignment(String),

    /// Configuration values outside their valid range.
    #[error("invalid tracker configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised by a [`TrackerPipeline`](crate::integration::TrackerPipeline).
#[derive(Debug, Error)]
pub enum PipelineError<E>
where
    E: std::error::Error + 'static,
{
    /// The external detector failed for this frame.
    #[error("detection failed: {0}")]
    Detection(#[source] E),

    /// The tracker skipped this frame.
    #[error(transparent)]
    Tracking(#[from] TrackerError),
}
