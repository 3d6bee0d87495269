//! Error types shared by the perception pipeline, the capability traits and
//! the control loop.

use thiserror::Error;

/// Rejected configuration values. Raised once, at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// The forward band would be empty or inverted.
    #[error("center_min ({center_min}) must be strictly less than center_max ({center_max})")]
    InvertedCenterBand {
        /// Lower lateral bound in pixels.
        center_min: u32,
        /// Upper lateral bound in pixels.
        center_max: u32,
    },

    /// Density thresholds live in [0, 1].
    #[error("intersection threshold {0} is not a finite value in [0, 1]")]
    ThresholdOutOfRange(f64),

    /// Two motor lines were mapped onto the same GPIO pin.
    #[error("motor pins must be four distinct GPIO lines, got {0:?}")]
    DuplicatePins([u8; 4]),

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value as found in the environment.
        value: String,
    },

    /// A configuration file could not be read or decoded.
    #[error("configuration file {path}: {reason}")]
    File {
        /// Path that was requested.
        path: String,
        /// Underlying I/O or decode failure.
        reason: String,
    },
}

/// A frame was not delivered. Always recoverable: the tick is skipped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AcquisitionError {
    #[error("no frame available")]
    NoFrame,

    #[error("capture device error: {0}")]
    Device(String),

    #[error("frame buffer of {actual} bytes does not match {width}x{height} RGB")]
    Malformed {
        width: u32,
        height: u32,
        actual: usize,
    },
}

/// Failures reported by an actuator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActuatorError {
    /// A movement was requested after `cleanup`.
    #[error("actuator outputs have been released")]
    Released,

    #[error("actuator hardware error: {0}")]
    Hardware(String),
}

/// Which collaborator failed to come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    FrameSource,
    Actuator,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Component::FrameSource => f.write_str("frame source"),
            Component::Actuator => f.write_str("actuator"),
        }
    }
}

/// Errors that end a control loop run.
#[derive(Debug, Error)]
pub enum LoopError {
    /// A collaborator could not be opened; the loop never entered `Running`.
    #[error("{component} initialization failed: {reason}")]
    Initialization {
        component: Component,
        reason: String,
    },

    /// The actuator rejected a command while running.
    #[error("actuator failure while running: {0}")]
    Actuator(#[from] ActuatorError),

    /// `tick`/`run` was called outside the `Running` state.
    #[error("control loop is not running")]
    NotRunning,

    /// `start` was called on a loop that already left `Idle`.
    #[error("control loop has already been started")]
    AlreadyStarted,
}
