// THEORY:
// This file is the entry point for the `line_follower` library crate. It
// exposes the perception pipeline (`LinePipeline`), the control loop
// (`ControlLoop`) and the two capability traits the loop is driven through
// (`FrameSource`, `ActuatorSink`). Hardware bindings live in the robot binary,
// so everything here runs on a development machine against synthetic frames.

pub mod actuator;
pub mod config;
pub mod control_loop;
pub mod core_modules;
pub mod error;
pub mod frame_source;
pub mod pipeline;

pub use actuator::{ActuatorSink, MotorCommand, MotorController, PinBank};
pub use config::{Calibration, MotorPins, RobotConfig};
pub use control_loop::{ControlLoop, LoopState, LoopStats, StopHandle, StopSignal, TickOutcome, stop_channel};
pub use error::{AcquisitionError, ActuatorError, ConfigError, LoopError};
pub use frame_source::FrameSource;
pub use pipeline::{Centroid, Command, Frame, LinePipeline, Perception};
