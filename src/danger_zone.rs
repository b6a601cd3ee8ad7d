//! Danger-zone policy over the confirmed tracks of one frame.
//!
//! Forward-facing cameras are mounted on one side of the vehicle and watch
//! the adjacent lane: a left-mounted camera warns on vehicles in the left half
//! of the frame, a right-mounted one on the right half. Rear-facing cameras
//! use apparent size as a proximity proxy and warn on any box covering more
//! than a configured share of the frame.

use serde::Deserialize;

use crate::tracker::{BBox, Track};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraOrientation {
    Forward(MountSide),
    #[default]
    Rear,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DangerZoneConfig {
    pub orientation: CameraOrientation,
    /// Rear mode: percentage of the frame area a box must exceed to warn.
    pub area_percent: f32,
}

impl Default for DangerZoneConfig {
    fn default() -> Self {
        Self {
            orientation: CameraOrientation::default(),
            area_percent: 2.0,
        }
    }
}

/// Warning for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Warning {
    pub active: bool,
    /// Boxes inside the danger zone
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct DangerZoneClassifier {
    config: DangerZoneConfig,
}

impl DangerZoneClassifier {
    pub fn new(config: DangerZoneConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DangerZoneConfig {
        &self.config
    }

    /// Classify the visible tracks of a `frame_width` x `frame_height` frame.
    pub fn classify(&self, visible: &[Track], frame_width: u32, frame_height: u32) -> Warning {
        self.classify_boxes(visible.iter().map(|t| &t.bbox), frame_width, frame_height)
    }

    pub fn classify_boxes<'a>(
        &self,
        boxes: impl IntoIterator<Item = &'a BBox>,
        frame_width: u32,
        frame_height: u32,
    ) -> Warning {
        let count = boxes
            .into_iter()
            .filter(|bbox| self.in_danger_zone(bbox, frame_width, frame_height))
            .count();
        Warning {
            active: count > 0,
            count,
        }
    }

    /// Degenerate boxes are never in the danger zone.
    pub fn in_danger_zone(&self, bbox: &BBox, frame_width: u32, frame_height: u32) -> bool {
        if bbox.is_degenerate() {
            return false;
        }
        match self.config.orientation {
            CameraOrientation::Forward(side) => {
                // Whole-pixel center against the integer midline.
                let center_x = ((bbox.xmin + bbox.xmax) / 2.0).trunc() as i64;
                let midline = (frame_width / 2) as i64;
                match side {
                    MountSide::Left => center_x <= midline,
                    MountSide::Right => center_x >= midline,
                }
            }
            CameraOrientation::Rear => {
                let frame_area = frame_width as f32 * frame_height as f32;
                if frame_area <= 0.0 {
                    return false;
                }
                100.0 * bbox.area() / frame_area > self.config.area_percent
            }
        }
    }
}
