//! Constant-velocity Kalman filter over the four box edges, using ndarray and a nalgebra-based inverse.
//!
//! The state interleaves every measured edge with its velocity:
//! `[ymin, ymin', xmin, xmin', ymax, ymax', xmax, xmax']`.

use ndarray::{Array1, Array2, s};
use serde::Deserialize;

/// Number of measured coordinates.
const NDIM: usize = 4;

/// Indices of the measured (position) components in the state vector.
pub const POSITION_INDICES: [usize; NDIM] = [0, 2, 4, 6];

/// Noise and timing parameters of the filter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KalmanConfig {
    /// Time step between frames.
    pub dt: f64,
    /// Diagonal of the covariance given to a freshly seeded track.
    pub initial_variance: f64,
    /// Scale applied to the discrete constant-velocity process noise.
    pub acceleration_noise: f64,
    /// Variance of each measured edge, in squared pixels.
    pub measurement_variance: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            initial_variance: 100.0,
            acceleration_noise: 1.0,
            measurement_variance: 6.25,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_noise: Array2<f64>,
    measurement_noise: Array2<f64>,
    initial_variance: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new(&KalmanConfig::default())
    }
}

impl KalmanFilter {
    pub fn new(config: &KalmanConfig) -> Self {
        let dt = config.dt;
        let ndim = 2 * NDIM;

        let mut motion_mat = Array2::<f64>::eye(ndim);
        for &p in &POSITION_INDICES {
            motion_mat[[p, p + 1]] = dt;
        }

        let mut update_mat = Array2::<f64>::zeros((NDIM, ndim));
        for (row, &p) in POSITION_INDICES.iter().enumerate() {
            update_mat[[row, p]] = 1.0;
        }

        // Block-diagonal discrete white-noise acceleration model.
        let block = ndarray::array![
            [dt.powi(4) / 2.0, dt.powi(3) / 2.0],
            [dt.powi(3) / 2.0, dt.powi(2)],
        ] * config.acceleration_noise;
        let mut process_noise = Array2::<f64>::zeros((ndim, ndim));
        for &p in &POSITION_INDICES {
            process_noise.slice_mut(s![p..p + 2, p..p + 2]).assign(&block);
        }

        let measurement_noise = Array2::<f64>::eye(NDIM) * config.measurement_variance;

        Self {
            motion_mat,
            update_mat,
            process_noise,
            measurement_noise,
            initial_variance: config.initial_variance,
        }
    }

    /// Seed a state from a measurement with zero velocity and a wide covariance.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::<f64>::zeros(2 * NDIM);
        for (&p, &z) in POSITION_INDICES.iter().zip(measurement.iter()) {
            mean[p] = z;
        }
        let covariance = Array2::<f64>::eye(2 * NDIM) * self.initial_variance;
        (mean, covariance)
    }

    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let new_mean = self.motion_mat.dot(mean);
        let new_covariance =
            self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + &self.process_noise;

        (new_mean, new_covariance)
    }

    /// Project the state into measurement space: `(H x, H P H^T + R)`.
    pub fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + &self.measurement_noise;

        (mean_proj, covariance_proj)
    }

    /// Kalman correction. Returns `None` when the innovation covariance is singular.
    pub fn update(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Option<(Array1<f64>, Array2<f64>)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1
        let s_inv = invert_4x4(&projected_cov)?;

        let pht = covariance.dot(&self.update_mat.t()); // 8x4
        let kalman_gain = pht.dot(&s_inv); // 8x4

        let new_mean = mean + &kalman_gain.dot(&innovation);
        let new_covariance = covariance - &kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Some((new_mean, new_covariance))
    }
}

/// Position components `[ymin, xmin, ymax, xmax]` of a state vector.
pub fn positions(mean: &Array1<f64>) -> [f64; 4] {
    POSITION_INDICES.map(|p| mean[p])
}

/// Invert a 4x4 matrix using nalgebra (pure Rust).
fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix4::from_fn(|i, j| m[[i, j]]);
    let inv = nm.try_inverse()?;
    Some(Array2::from_shape_fn((NDIM, NDIM), |(i, j)| inv[(i, j)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_initiate() {
        let kf = KalmanFilter::default();
        let (mean, cov) = kf.initiate([100.0, 200.0, 150.0, 300.0]);
        assert_eq!(positions(&mean), [100.0, 200.0, 150.0, 300.0]);
        assert_eq!(mean[1], 0.0);
        assert_eq!(mean[7], 0.0);
        assert_eq!(cov[[3, 3]], 100.0);
        assert_eq!(cov[[0, 1]], 0.0);
    }

    #[test]
    fn test_predict_moves_by_velocity() {
        let kf = KalmanFilter::default();
        let (mut mean, cov) = kf.initiate([10.0, 20.0, 30.0, 40.0]);
        mean[1] = 2.0;
        mean[3] = -1.0;
        let (mean, new_cov) = kf.predict(&mean, &cov);
        assert_eq!(positions(&mean), [12.0, 19.0, 30.0, 40.0]);
        // P' = F P F^T + Q: position variance grows by P_vv + Q_pp.
        assert_relative_eq!(new_cov[[0, 0]], 100.0 + 100.0 + 0.5, epsilon = 1e-9);
        assert_relative_eq!(new_cov[[0, 1]], 100.0 + 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_process_noise_is_block_diagonal() {
        let kf = KalmanFilter::new(&KalmanConfig {
            acceleration_noise: 2.0,
            ..KalmanConfig::default()
        });
        assert_eq!(kf.process_noise[[2, 2]], 1.0);
        assert_eq!(kf.process_noise[[2, 3]], 1.0);
        assert_eq!(kf.process_noise[[3, 3]], 2.0);
        assert_eq!(kf.process_noise[[1, 2]], 0.0);
    }

    #[test]
    fn test_update_pulls_towards_measurement() {
        let kf = KalmanFilter::default();
        let (mean, cov) = kf.initiate([100.0, 100.0, 200.0, 200.0]);
        let (mean, cov) = kf.predict(&mean, &cov);
        let (mean, cov_upd) = kf
            .update(&mean, &cov, [110.0, 100.0, 210.0, 200.0])
            .expect("well-conditioned update");

        let p = positions(&mean);
        assert!(p[0] > 100.0 && p[0] < 110.0);
        assert!(p[2] > 200.0 && p[2] < 210.0);
        assert_relative_eq!(p[1], 100.0, epsilon = 1e-9);
        // Velocity is inferred from the position residual.
        assert!(mean[1] > 0.0);
        assert!(cov_upd[[0, 0]] < cov[[0, 0]]);
    }

    #[test]
    fn test_update_singular_innovation() {
        let kf = KalmanFilter::new(&KalmanConfig {
            measurement_variance: 0.0,
            ..KalmanConfig::default()
        });
        let mean = Array1::zeros(8);
        let cov = Array2::zeros((8, 8));
        assert!(kf.update(&mean, &cov, [1.0, 2.0, 3.0, 4.0]).is_none());
    }
}
