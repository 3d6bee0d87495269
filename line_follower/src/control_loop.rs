// THEORY:
// The `ControlLoop` is the orchestrator. It owns the two external
// capabilities (a `FrameSource` and an `ActuatorSink`) for exactly as long as
// it runs, and drives them through a three-state machine:
//
//   Idle --start ok--> Running --stop signal / actuator failure--> Stopped
//   Idle --start failed------------------------------------------> Stopped
//
// One tick pulls one frame, runs the whole perception pipeline and issues the
// steering command. If the frame shows an intersection, a `Right` follows as a
// second command in the same tick, so the turn is what remains in effect. A
// missing frame skips the tick and nothing is issued.
//
// Shutdown is the single exit path. Whatever was acquired is commanded to stop
// and released exactly once, whether the loop ends normally, fails to start,
// hits an actuator error, or is dropped during unwinding.

use crate::actuator::{ActuatorSink, MotorCommand};
use crate::core_modules::command_policy::Command;
use crate::error::{AcquisitionError, ActuatorError, Component, LoopError};
use crate::frame_source::FrameSource;
use crate::pipeline::{LinePipeline, Perception};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Lifecycle of a [`ControlLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No frame was delivered; nothing was issued.
    Skipped(AcquisitionError),
    /// The frame was processed and its commands issued.
    Issued(Perception),
}

/// Counters for the shutdown log line. Never read by the decision logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub ticks: u64,
    pub skipped: u64,
    pub intersections: u64,
}

/// Raising side of the stop request.
#[derive(Debug)]
pub struct StopHandle(watch::Sender<bool>);

impl StopHandle {
    pub fn raise(&self) {
        self.0.send_replace(true);
    }
}

/// Observing side of the stop request, checked at tick boundaries.
#[derive(Debug, Clone)]
pub struct StopSignal(watch::Receiver<bool>);

impl StopSignal {
    pub fn is_raised(&self) -> bool {
        *self.0.borrow()
    }
}

/// Creates a connected stop handle/signal pair, initially not raised.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle(tx), StopSignal(rx))
}

/// Frame-rate loop from camera to motors.
pub struct ControlLoop<S: FrameSource, A: ActuatorSink> {
    pipeline: LinePipeline,
    tick_pause: Duration,
    state: LoopState,
    source: Option<S>,
    actuator: Option<A>,
    stats: LoopStats,
}

impl<S: FrameSource, A: ActuatorSink> ControlLoop<S, A> {
    /// A loop in `Idle` holding no resources yet.
    pub fn new(pipeline: LinePipeline, tick_pause: Duration) -> Self {
        Self {
            pipeline,
            tick_pause,
            state: LoopState::Idle,
            source: None,
            actuator: None,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Acquires the actuator, then the frame source.
    ///
    /// On failure the loop goes straight to `Stopped`, stopping and releasing
    /// anything already acquired, and the error is returned to the caller.
    pub fn start<FS, FA, ES, EA>(&mut self, open_source: FS, open_actuator: FA) -> Result<(), LoopError>
    where
        FS: FnOnce() -> Result<S, ES>,
        FA: FnOnce() -> Result<A, EA>,
        ES: Display,
        EA: Display,
    {
        if self.state != LoopState::Idle {
            return Err(LoopError::AlreadyStarted);
        }

        match open_actuator() {
            Ok(actuator) => self.actuator = Some(actuator),
            Err(e) => return Err(self.fail_start(Component::Actuator, e)),
        }

        match open_source() {
            Ok(source) => {
                let (width, height) = source.dimensions();
                info!(width, height, "frame source opened");
                self.source = Some(source);
            }
            Err(e) => return Err(self.fail_start(Component::FrameSource, e)),
        }

        self.state = LoopState::Running;
        info!(
            center_min = self.pipeline.calibration().center_min(),
            center_max = self.pipeline.calibration().center_max(),
            intersection_threshold = self.pipeline.calibration().intersection_threshold(),
            "line following started"
        );
        Ok(())
    }

    fn fail_start(&mut self, component: Component, reason: impl Display) -> LoopError {
        let reason = reason.to_string();
        warn!(%component, %reason, "initialization failed");
        self.shutdown();
        LoopError::Initialization { component, reason }
    }

    /// Processes exactly one frame.
    pub fn tick(&mut self) -> Result<TickOutcome, LoopError> {
        if self.state != LoopState::Running {
            return Err(LoopError::NotRunning);
        }
        let (Some(source), Some(actuator)) = (self.source.as_mut(), self.actuator.as_mut()) else {
            return Err(LoopError::NotRunning);
        };

        let frame = match source.read() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "failed to grab frame, skipping tick");
                self.stats.skipped += 1;
                return Ok(TickOutcome::Skipped(e));
            }
        };

        let perception = self.pipeline.perceive(&frame);
        if let Err(e) = issue(actuator, &perception) {
            warn!(error = %e, "actuator rejected command");
            self.shutdown();
            return Err(e.into());
        }

        self.stats.ticks += 1;
        if perception.intersection {
            self.stats.intersections += 1;
        }
        Ok(TickOutcome::Issued(perception))
    }

    /// Ticks until `stop` is raised, then shuts down.
    pub fn run(&mut self, stop: &StopSignal) -> Result<LoopStats, LoopError> {
        if self.state != LoopState::Running {
            return Err(LoopError::NotRunning);
        }

        while self.state == LoopState::Running {
            if stop.is_raised() {
                info!("stop requested");
                break;
            }
            self.tick()?;
            if !self.tick_pause.is_zero() {
                std::thread::sleep(self.tick_pause);
            }
        }

        self.shutdown();
        Ok(self.stats)
    }

    /// Stops the motors and releases both collaborators. Idempotent.
    pub fn shutdown(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.state = LoopState::Stopped;

        if let Some(mut actuator) = self.actuator.take() {
            if let Err(e) = actuator.apply(MotorCommand::Stop) {
                warn!(error = %e, "final stop command failed");
            }
            actuator.cleanup();
        }
        if let Some(mut source) = self.source.take() {
            source.release();
        }

        info!(
            ticks = self.stats.ticks,
            skipped = self.stats.skipped,
            intersections = self.stats.intersections,
            "line following stopped"
        );
    }
}

impl<S: FrameSource, A: ActuatorSink> Drop for ControlLoop<S, A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Sends the steering command, then the intersection turn if one is in view.
fn issue<A: ActuatorSink>(actuator: &mut A, perception: &Perception) -> Result<(), ActuatorError> {
    match perception.command {
        Command::Left => debug!("turn left"),
        Command::Forward => debug!("on track"),
        Command::Right => debug!("turn right"),
        Command::Stop => debug!("line lost, stop"),
    }
    actuator.apply(perception.command.into())?;

    if perception.intersection {
        info!("intersection detected, turning right");
        actuator.apply(MotorCommand::Right)?;
    }
    Ok(())
}
