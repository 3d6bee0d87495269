#![allow(dead_code)]

use image::Rgb;
use line_follower::{AcquisitionError, ActuatorError, ActuatorSink, Frame, FrameSource, MotorCommand};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;

/// A black frame of the default camera size.
pub fn black_frame() -> Frame {
    Frame::new(WIDTH, HEIGHT)
}

/// A black frame with a full-height white stripe of `half_width` on each side of `center`.
pub fn vertical_stripe(center: u32, half_width: u32) -> Frame {
    let mut frame = black_frame();
    for y in 0..HEIGHT {
        for x in center - half_width..=center + half_width {
            frame.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    frame
}

/// Paints the middle-right cell of the 3x3 grid white.
pub fn with_crossing(mut frame: Frame) -> Frame {
    for y in HEIGHT / 3..HEIGHT * 2 / 3 {
        for x in WIDTH * 2 / 3..WIDTH {
            frame.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }
    frame
}

/// Everything the fakes observed, shared with the test after the loop drops them.
#[derive(Debug, Default)]
pub struct Journal {
    pub commands: Vec<MotorCommand>,
    pub cleanups: u32,
    pub effective_cleanups: u32,
    pub source_releases: u32,
    pub frames_read: u32,
}

pub type SharedJournal = Rc<RefCell<Journal>>;

pub fn journal() -> SharedJournal {
    Rc::new(RefCell::new(Journal::default()))
}

/// Plays back a fixed script of frames and failures, then reports `NoFrame` forever.
pub struct ScriptedSource {
    script: VecDeque<Result<Frame, AcquisitionError>>,
    journal: SharedJournal,
    released: bool,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Frame, AcquisitionError>>, journal: SharedJournal) -> Self {
        Self { script: script.into(), journal, released: false }
    }
}

impl FrameSource for ScriptedSource {
    fn read(&mut self) -> Result<Frame, AcquisitionError> {
        self.journal.borrow_mut().frames_read += 1;
        self.script.pop_front().unwrap_or(Err(AcquisitionError::NoFrame))
    }

    fn dimensions(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.journal.borrow_mut().source_releases += 1;
        }
    }
}

/// Records every command; can be told to fail on a given command.
pub struct RecordingActuator {
    journal: SharedJournal,
    fail_on: Option<MotorCommand>,
    released: bool,
}

impl RecordingActuator {
    pub fn new(journal: SharedJournal) -> Self {
        Self { journal, fail_on: None, released: false }
    }

    pub fn failing_on(journal: SharedJournal, command: MotorCommand) -> Self {
        Self { journal, fail_on: Some(command), released: false }
    }
}

impl ActuatorSink for RecordingActuator {
    fn apply(&mut self, command: MotorCommand) -> Result<(), ActuatorError> {
        if self.fail_on == Some(command) {
            return Err(ActuatorError::Hardware("injected".to_string()));
        }
        if self.released && command != MotorCommand::Stop {
            return Err(ActuatorError::Released);
        }
        self.journal.borrow_mut().commands.push(command);
        Ok(())
    }

    fn cleanup(&mut self) {
        let mut journal = self.journal.borrow_mut();
        journal.cleanups += 1;
        if !self.released {
            self.released = true;
            journal.effective_cleanups += 1;
        }
    }
}
