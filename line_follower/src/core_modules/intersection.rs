// THEORY:
// The intersection detector looks at one fixed cell of a 3x3 partition of the
// binary image: the middle row, right column. A crossing line enters the
// camera's forward-right field of view there first. If the share of white
// pixels in that cell is above the calibrated threshold, the frame shows an
// intersection.
//
// The decision uses density only. A zero-area cell, as produced by images too
// small to partition, is never an intersection.

use crate::core_modules::frame::BinaryImage;
use tracing::trace;

/// Intensities at or below this bound count as black inside the ROI.
pub const ROI_BLACK_MAX: u8 = 50;
/// Intensities at or above this bound count as white inside the ROI.
pub const ROI_WHITE_MIN: u8 = 200;

/// A rectangular, half-open pixel region: `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Roi {
    /// Middle-right cell of the 3x3 grid over a `width` x `height` image.
    pub fn middle_right(width: u32, height: u32) -> Self {
        Self {
            x0: width * 2 / 3,
            y0: height / 3,
            x1: width,
            y1: height * 2 / 3,
        }
    }

    pub fn area(&self) -> u64 {
        self.x1.saturating_sub(self.x0) as u64 * self.y1.saturating_sub(self.y0) as u64
    }
}

/// Pixel classification counts inside an ROI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiCensus {
    pub black: u64,
    pub white: u64,
    pub area: u64,
}

impl RoiCensus {
    /// White-pixel density in `[0, 1]`; zero for an empty region.
    pub fn white_density(&self) -> f64 {
        if self.area == 0 {
            return 0.0;
        }
        self.white as f64 / self.area as f64
    }
}

/// Counts black-band and white-band pixels inside `roi`.
pub fn census(binary: &BinaryImage, roi: Roi) -> RoiCensus {
    let mut black = 0;
    let mut white = 0;
    for y in roi.y0..roi.y1 {
        for x in roi.x0..roi.x1 {
            let value = binary.get_pixel(x, y).0[0];
            if value <= ROI_BLACK_MAX {
                black += 1;
            } else if value >= ROI_WHITE_MIN {
                white += 1;
            }
        }
    }
    RoiCensus { black, white, area: roi.area() }
}

/// Decides whether an intersection is in view.
#[derive(Debug, Clone, Copy)]
pub struct IntersectionDetector {
    threshold: f64,
}

impl IntersectionDetector {
    /// `threshold` is expected to have been validated by `Calibration`.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// True iff the ROI's white density is strictly above the threshold.
    pub fn detect(&self, binary: &BinaryImage) -> bool {
        let (width, height) = binary.dimensions();
        let roi = Roi::middle_right(width, height);
        let counts = census(binary, roi);
        if counts.area == 0 {
            return false;
        }

        let density = counts.white_density();
        trace!(
            black = counts.black,
            white = counts.white,
            area = counts.area,
            density,
            "intersection roi census"
        );
        density > self.threshold
    }
}
