//! Integration module for connecting vehicle detectors with the tracker.
//!
//! This module provides the detector traits, the post-processing filter for
//! raw model output, and per-camera pipelines that run detection, tracking
//! and the danger-zone policy for every frame.

mod builder;
mod detector;
mod dual_camera;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionFilter, DetectionSource, FilteredDetector, RawDetection, RawDetector};
pub use dual_camera::{CameraFrame, DualCameraMonitor, DualReport};
pub use pipeline::{StreamConfig, StreamReport, TrackerPipeline};
