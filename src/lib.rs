//! Multi-vehicle tracking for driver-assistance cameras.
//!
//! Per-frame detections are associated with Kalman-filtered tracks through an
//! optimal IoU assignment; confirmed tracks feed a danger-zone classifier
//! that raises a warning when a vehicle enters the watched area.
//!
//! ```rust,ignore
//! use vehicle_tracker_rs::{Detection, TrackerConfig, VehicleTracker};
//!
//! let mut tracker = VehicleTracker::new(TrackerConfig::default())?;
//! let report = tracker.update(&[Detection::new(120.0, 40.0, 220.0, 200.0, 0.9)])?;
//! for track in &report.visible {
//!     println!("{} at {:?}", track.track_id, track.bbox);
//! }
//! ```

pub mod danger_zone;
pub mod error;
pub mod integration;
pub mod tracker;

pub use danger_zone::{
    CameraOrientation, DangerZoneClassifier, DangerZoneConfig, MountSide, Warning,
};
pub use error::{PipelineError, TrackerError};
pub use integration::{DetectionSource, StreamConfig, TrackerPipeline};
pub use tracker::{
    BBox, Detection, FrameReport, IdentityPool, Track, TrackId, TrackState, TrackerConfig,
    VehicleTracker,
};
