// THEORY:
// The `pipeline` module is the top-level perception API. It runs every
// per-frame stage in order and hands back one `Perception` value, so the
// control loop never has to know how a frame was thresholded or searched.
//
// Stage order for a single frame:
// 1.  Preprocessing: grayscale, binary and near-white mask.
// 2.  Line location: largest mask blob and its centroid.
// 3.  Steering: three-zone command from the centroid.
// 4.  Intersection check: white density of the middle-right ROI of the binary.
//
// The pipeline holds only the immutable calibration. Two calls with the same
// frame always produce the same perception.

use crate::config::Calibration;
use crate::core_modules::command_policy::CommandPolicy;
use crate::core_modules::intersection::IntersectionDetector;
use crate::core_modules::line_locator;
use crate::core_modules::preprocessor;

pub use crate::core_modules::command_policy::Command;
pub use crate::core_modules::frame::{Centroid, Frame};

/// Everything one frame says about the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub centroid: Option<Centroid>,
    pub command: Command,
    pub intersection: bool,
}

/// Frame-to-command perception for a fixed calibration.
#[derive(Debug, Clone)]
pub struct LinePipeline {
    calibration: Calibration,
    policy: CommandPolicy,
    detector: IntersectionDetector,
}

impl LinePipeline {
    pub fn new(calibration: Calibration) -> Self {
        Self {
            calibration,
            policy: CommandPolicy::new(&calibration),
            detector: IntersectionDetector::new(calibration.intersection_threshold()),
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn perceive(&self, frame: &Frame) -> Perception {
        let views = preprocessor::preprocess(frame);
        let centroid = line_locator::locate(&views.mask);
        let command = self.policy.decide(centroid);
        let intersection = self.detector.detect(&views.binary);

        Perception { centroid, command, intersection }
    }
}

impl Default for LinePipeline {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}
