mod bbox;
mod identity;
mod kalman_filter;
mod matching;
mod track;
mod track_state;
mod vehicle_tracker;

pub use bbox::{BBox, iou_batch};
pub use identity::{IdentityPool, TrackId, TrackLabel};
pub use kalman_filter::{KalmanConfig, KalmanFilter};
pub use matching::{AssignmentResult, Detection, iou_matrix, linear_assignment};
pub use track::Track;
pub use track_state::TrackState;
pub use vehicle_tracker::{AgePolicy, FrameReport, TrackerConfig, TrackerStats, VehicleTracker};
