//! Single vehicle track for multi-object tracking.

use ndarray::{Array1, Array2};

use crate::error::TrackerError;
use crate::tracker::bbox::BBox;
use crate::tracker::identity::TrackId;
use crate::tracker::kalman_filter::{self, KalmanFilter};
use crate::tracker::track_state::TrackState;

/// Single vehicle track.
#[derive(Debug, Clone)]
pub struct Track {
    /// Identity drawn from the stream's pool
    pub track_id: TrackId,
    /// Current lifecycle state
    pub state: TrackState,
    /// Frames in which this track was matched to a detection, the spawning one included
    pub hits: u32,
    /// Frames in which this track went unmatched
    pub unmatched: u32,
    /// Kalman filter state mean (8-dim)
    pub mean: Array1<f64>,
    /// Kalman filter state covariance (8x8)
    pub covariance: Array2<f64>,
    /// Position part of the state rounded to whole pixels
    pub bbox: BBox,
}

impl Track {
    /// Spawn a track from an unmatched detection.
    ///
    /// The state is seeded at the detection with zero velocity and advanced
    /// by one prediction, so `bbox` is the look-ahead estimate.
    pub fn new(track_id: TrackId, detection: &BBox, kalman_filter: &KalmanFilter) -> Self {
        let (mean, covariance) = kalman_filter.initiate(detection.to_measurement());
        let mut track = Self {
            track_id,
            state: TrackState::Tentative,
            hits: 1,
            unmatched: 0,
            mean,
            covariance,
            bbox: *detection,
        };
        track.predict(kalman_filter);
        track
    }

    /// Advance the state one frame without a measurement.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.refresh_bbox();
    }

    /// Predict, then correct with the matched detection.
    ///
    /// On error the track is left as it was.
    pub fn predict_and_update(
        &mut self,
        detection: &BBox,
        kalman_filter: &KalmanFilter,
    ) -> Result<(), TrackerError> {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        let (mean, covariance) = kalman_filter
            .update(&mean, &covariance, detection.to_measurement())
            .ok_or(TrackerError::SingularInnovation {
                track_id: self.track_id,
            })?;
        self.mean = mean;
        self.covariance = covariance;
        self.refresh_bbox();
        Ok(())
    }

    /// Estimated velocity of each edge `[ymin', xmin', ymax', xmax']` in pixels per frame.
    pub fn velocity(&self) -> [f64; 4] {
        kalman_filter::POSITION_INDICES.map(|p| self.mean[p + 1])
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn mark_confirmed(&mut self) {
        self.state = TrackState::Confirmed;
    }

    pub fn mark_deleted(&mut self) {
        self.state = TrackState::Deleted;
    }

    fn refresh_bbox(&mut self) {
        self.bbox = BBox::from_measurement(kalman_filter::positions(&self.mean)).rounded();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_track_predicts_once() {
        let kf = KalmanFilter::default();
        let det = BBox::new(100.0, 200.0, 150.0, 300.0);
        let track = Track::new(TrackId(1), &det, &kf);

        // Zero velocity: the look-ahead lands on the detection itself.
        assert_eq!(track.bbox, det);
        assert_eq!(track.hits, 1);
        assert_eq!(track.unmatched, 0);
        assert_eq!(track.state, TrackState::Tentative);
        // One prediction has already widened the covariance.
        assert!(track.covariance[[0, 0]] > 100.0);
    }

    #[test]
    fn test_predict_and_update_follows_motion() {
        let kf = KalmanFilter::default();
        let mut track = Track::new(TrackId(1), &BBox::new(100.0, 100.0, 200.0, 200.0), &kf);

        for step in 1..=10 {
            let shift = 5.0 * step as f32;
            let det = BBox::new(100.0, 100.0 + shift, 200.0, 200.0 + shift);
            track.predict_and_update(&det, &kf).unwrap();
        }

        let v = track.velocity();
        assert!((v[1] - 5.0).abs() < 1.0, "xmin velocity {}", v[1]);
        assert!(v[0].abs() < 1.0);
        assert!((track.bbox.xmin - 150.0).abs() <= 3.0);

        // Coasting keeps moving along the estimated velocity.
        let before = track.bbox.xmin;
        track.predict(&kf);
        assert!(track.bbox.xmin > before);
    }

    #[test]
    fn test_bbox_is_rounded() {
        let kf = KalmanFilter::default();
        let mut track = Track::new(TrackId(1), &BBox::new(10.0, 10.0, 50.0, 50.0), &kf);
        track
            .predict_and_update(&BBox::new(11.0, 13.0, 52.0, 51.0), &kf)
            .unwrap();
        assert_eq!(track.bbox, track.bbox.rounded());
    }
}
