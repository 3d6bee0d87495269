// THEORY:
// The command policy is the whole control law: a fixed three-zone classifier
// on the line's lateral position. With `center_min < center_max` the zones
// partition every possible x with no gap and no overlap:
//
//   x <= center_min            -> Right
//   center_min < x < center_max -> Forward
//   x >= center_max            -> Left
//
// Both boundary points belong to a turning zone, never to Forward. No line at
// all means Stop. The policy is total and has no memory.

use crate::config::Calibration;
use crate::core_modules::frame::Centroid;

/// Discrete steering decision for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Left,
    Forward,
    Right,
    Stop,
}

/// Maps a centroid onto a [`Command`] using the calibrated lateral band.
#[derive(Debug, Clone, Copy)]
pub struct CommandPolicy {
    center_min: u32,
    center_max: u32,
}

impl CommandPolicy {
    pub fn new(calibration: &Calibration) -> Self {
        Self {
            center_min: calibration.center_min(),
            center_max: calibration.center_max(),
        }
    }

    pub fn decide(&self, centroid: Option<Centroid>) -> Command {
        match centroid {
            None => Command::Stop,
            Some(point) => self.steer(point.x),
        }
    }

    /// The three-zone classifier on a lateral pixel coordinate.
    pub fn steer(&self, x: u32) -> Command {
        if x >= self.center_max {
            Command::Left
        } else if x <= self.center_min {
            Command::Right
        } else {
            Command::Forward
        }
    }
}
