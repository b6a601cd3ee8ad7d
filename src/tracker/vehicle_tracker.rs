//! Per-stream track lifecycle: association, spawning, aging and deletion.

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::error::TrackerError;
use crate::tracker::bbox::BBox;
use crate::tracker::identity::{IdentityPool, TrackId};
use crate::tracker::kalman_filter::{KalmanConfig, KalmanFilter};
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// How the unmatched counter of a track evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgePolicy {
    /// Never reset: `max_age` bounds the total number of unmatched frames.
    #[default]
    Cumulative,
    /// Reset on every match: `max_age` bounds consecutive unmatched frames.
    Consecutive,
}

/// Configuration for the VehicleTracker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Unmatched frames tolerated before a track is deleted
    pub max_age: u32,
    /// Matches required before a track is reported
    pub min_hits: u32,
    /// Association gate: a matched pair must have IoU strictly above this
    pub min_iou: f32,
    pub age_policy: AgePolicy,
    pub kalman: KalmanConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 4,
            min_hits: 10,
            min_iou: 0.25,
            age_policy: AgePolicy::default(),
            kalman: KalmanConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(0.0..=1.0).contains(&self.min_iou) {
            return Err(TrackerError::InvalidConfig(format!(
                "min_iou must lie in [0, 1], got {}",
                self.min_iou
            )));
        }
        if self.min_hits == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_hits must be at least 1".to_string(),
            ));
        }
        let kalman = &self.kalman;
        for (name, value) in [
            ("kalman.dt", kalman.dt),
            ("kalman.initial_variance", kalman.initial_variance),
            ("kalman.measurement_variance", kalman.measurement_variance),
        ] {
            if !(value > 0.0) {
                return Err(TrackerError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(kalman.acceleration_noise >= 0.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "kalman.acceleration_noise must be non-negative, got {}",
                kalman.acceleration_noise
            )));
        }
        Ok(())
    }
}

/// Outcome of one [`VehicleTracker::update`] call.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame_id: u64,
    /// Confirmed tracks with a non-degenerate box, in track-set order
    pub visible: Vec<Track>,
    /// Tracks corrected by a detection this frame
    pub matched: usize,
    /// Identities given to tracks spawned this frame
    pub spawned: Vec<TrackId>,
    /// Identities released this frame
    pub deleted: Vec<TrackId>,
    /// Degenerate detections dropped before association
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Frames whose update was applied
    pub frames: u64,
    /// Frames dropped because of an error
    pub skipped_frames: u64,
    pub created: u64,
    pub deleted: u64,
}

/// Track set and identity pool of one camera stream.
#[derive(Debug, Clone)]
struct TrackSet {
    tracks: Vec<Track>,
    pool: IdentityPool,
}

pub struct VehicleTracker {
    set: TrackSet,
    frame_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
    stats: TrackerStats,
}

impl VehicleTracker {
    /// Tracker with an unbounded identity pool.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::with_identity_pool(config, IdentityPool::unbounded())
    }

    pub fn with_identity_pool(
        config: TrackerConfig,
        pool: IdentityPool,
    ) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            set: TrackSet {
                tracks: Vec::new(),
                pool,
            },
            frame_id: 0,
            kalman_filter: KalmanFilter::new(&config.kalman),
            config,
            stats: TrackerStats::default(),
        })
    }

    /// Process one frame of detections.
    ///
    /// The update is staged and committed only on success: on `Err` the
    /// tracks and identity pool keep their state from the previous frame.
    pub fn update(&mut self, detections: &[Detection]) -> Result<FrameReport, TrackerError> {
        self.frame_id += 1;

        let mut rejected = 0;
        let boxes: Vec<BBox> = detections
            .iter()
            .filter(|det| {
                if det.bbox.is_degenerate() {
                    warn!(frame_id = self.frame_id, bbox = ?det.bbox, "dropping degenerate detection");
                    rejected += 1;
                    false
                } else {
                    true
                }
            })
            .map(|det| det.bbox)
            .collect();

        match self.step(&boxes) {
            Ok((set, mut report)) => {
                self.set = set;
                self.stats.frames += 1;
                self.stats.created += report.spawned.len() as u64;
                self.stats.deleted += report.deleted.len() as u64;
                report.frame_id = self.frame_id;
                report.rejected = rejected;
                Ok(report)
            }
            Err(err) => {
                self.stats.skipped_frames += 1;
                warn!(frame_id = self.frame_id, error = %err, "skipping frame update");
                Err(err)
            }
        }
    }

    fn step(&self, detections: &[BBox]) -> Result<(TrackSet, FrameReport), TrackerError> {
        let mut set = self.set.clone();
        let kf = &self.kalman_filter;

        // Step 1: Associate current track boxes with detections
        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = if set.tracks.is_empty() || detections.is_empty() {
            AssignmentResult::all_unmatched(set.tracks.len(), detections.len())
        } else {
            let track_boxes: Vec<BBox> = set.tracks.iter().map(|t| t.bbox).collect();
            let ious = matching::iou_matrix(&track_boxes, detections);
            matching::linear_assignment(&ious, self.config.min_iou)?
        };

        // Step 2: Correct matched tracks
        for &(itrack, idet) in &matches {
            let track = &mut set.tracks[itrack];
            track.predict_and_update(&detections[idet], kf)?;
            track.hits += 1;
            if self.config.age_policy == AgePolicy::Consecutive {
                track.unmatched = 0;
            }
        }

        // Step 3: Spawn tracks for unmatched detections
        let mut spawned = Vec::with_capacity(unmatched_detections.len());
        for &idet in &unmatched_detections {
            let track_id = set.pool.allocate()?;
            trace!(track_id = %set.pool.label(track_id), bbox = ?detections[idet], "spawning track");
            set.tracks.push(Track::new(track_id, &detections[idet], kf));
            spawned.push(track_id);
        }

        // Step 4: Coast unmatched tracks
        for &itrack in &unmatched_tracks {
            let track = &mut set.tracks[itrack];
            track.predict(kf);
            track.unmatched += 1;
        }

        // Step 5: Confirm, report and delete
        let mut visible = Vec::new();
        for track in set.tracks.iter_mut() {
            if track.unmatched > self.config.max_age {
                track.mark_deleted();
            } else if track.hits >= self.config.min_hits {
                track.mark_confirmed();
                // A coasting box whose edges crossed stays active but hidden.
                if track.bbox.is_degenerate() {
                    trace!(
                        track_id = %set.pool.label(track.track_id),
                        bbox = ?track.bbox,
                        "hiding inverted track box"
                    );
                } else {
                    visible.push(track.clone());
                }
            }
        }

        let mut deleted = Vec::new();
        let TrackSet { tracks, pool } = &mut set;
        tracks.retain(|track| {
            if track.state == TrackState::Deleted {
                trace!(track_id = %pool.label(track.track_id), hits = track.hits, "deleting track");
                pool.release(track.track_id);
                deleted.push(track.track_id);
                false
            } else {
                true
            }
        });

        debug!(
            frame_id = self.frame_id,
            matched = matches.len(),
            spawned = spawned.len(),
            coasting = unmatched_tracks.len(),
            deleted = deleted.len(),
            visible = visible.len(),
            "frame update"
        );

        let report = FrameReport {
            frame_id: self.frame_id,
            visible,
            matched: matches.len(),
            spawned,
            deleted,
            rejected: 0,
        };
        Ok((set, report))
    }

    /// All active tracks, confirmed or not.
    pub fn tracks(&self) -> &[Track] {
        &self.set.tracks
    }

    pub fn identity_pool(&self) -> &IdentityPool {
        &self.set.pool
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Number of `update` calls so far, skipped frames included.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }
}
