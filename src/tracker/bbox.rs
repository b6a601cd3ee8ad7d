/// Axis-aligned bounding box in pixel coordinates.
///
/// Coordinates follow the detector layout `(ymin, xmin, ymax, xmax)`, which
/// is also the order of the measured components in the Kalman state.
/// A usable box has `ymax > ymin` and `xmax > xmin`; see [`BBox::is_degenerate`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    /// Top edge
    pub ymin: f32,
    /// Left edge
    pub xmin: f32,
    /// Bottom edge
    pub ymax: f32,
    /// Right edge
    pub xmax: f32,
}

impl BBox {
    /// Create a box from `(ymin, xmin, ymax, xmax)`.
    #[inline]
    pub fn new(ymin: f32, xmin: f32, ymax: f32, xmax: f32) -> Self {
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }

    /// Create a box from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(y1, x1, y2, x2)
    }

    /// Create a box from normalized `(ymin, xmin, ymax, xmax)` in `[0, 1]`,
    /// scaled to a `width` x `height` frame and truncated to whole pixels.
    #[inline]
    pub fn from_normalized(normalized: [f32; 4], width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self::new(
            (normalized[0] * h).trunc(),
            (normalized[1] * w).trunc(),
            (normalized[2] * h).trunc(),
            (normalized[3] * w).trunc(),
        )
    }

    /// Build a box from a measurement vector `[ymin, xmin, ymax, xmax]`.
    #[inline]
    pub fn from_measurement(z: [f64; 4]) -> Self {
        Self::new(z[0] as f32, z[1] as f32, z[2] as f32, z[3] as f32)
    }

    /// Measurement vector `[ymin, xmin, ymax, xmax]` fed to the Kalman filter.
    #[inline]
    pub fn to_measurement(&self) -> [f64; 4] {
        [
            self.ymin as f64,
            self.xmin as f64,
            self.ymax as f64,
            self.xmax as f64,
        ]
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    /// Get the area of the bounding box.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Get the center point as `(x, y)`.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }

    /// True when the box has no positive area (or carries NaN coordinates).
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Round every coordinate to the nearest whole pixel.
    #[inline]
    pub fn rounded(&self) -> Self {
        Self::new(
            self.ymin.round(),
            self.xmin.round(),
            self.ymax.round(),
            self.xmax.round(),
        )
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    ///
    /// Intersection sides are clamped at zero, so disjoint boxes score `0.0`.
    /// A degenerate box on either side scores `0.0` as well.
    pub fn iou(&self, other: &BBox) -> f32 {
        if self.is_degenerate() || other.is_degenerate() {
            return 0.0;
        }
        let inter_width = (self.xmax.min(other.xmax) - self.xmin.max(other.xmin)).max(0.0);
        let inter_height = (self.ymax.min(other.ymax) - self.ymin.max(other.ymin)).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    }
}

use ndarray::Array2;

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[BBox], boxes_b: &[BBox]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
