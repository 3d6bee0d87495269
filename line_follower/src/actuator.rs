// THEORY:
// The actuator side of the loop. `ActuatorSink` is the capability the control
// loop drives; `MotorController` is the one real implementation, a
// differential drive built from two H-bridge motors. It knows the drive
// patterns but not the hardware: the four output lines come from a `PinBank`,
// so the same controller runs on Raspberry Pi GPIO in production and on an
// in-memory bank in tests.
//
// Every movement first de-energizes all four lines, then applies its pattern.
// `cleanup` de-energizes and releases the bank exactly once. After that only
// `Stop` is accepted, as a no-op.

use crate::core_modules::command_policy::Command;
use crate::error::ActuatorError;
use tracing::{debug, info};

/// Every command an actuator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorCommand {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

impl From<Command> for MotorCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Left => MotorCommand::Left,
            Command::Forward => MotorCommand::Forward,
            Command::Right => MotorCommand::Right,
            Command::Stop => MotorCommand::Stop,
        }
    }
}

/// Accepts one discrete command per call.
pub trait ActuatorSink {
    /// Applies `command`. `Stop` must succeed at any time, including after `cleanup`.
    fn apply(&mut self, command: MotorCommand) -> Result<(), ActuatorError>;

    /// De-energizes every output and releases the hardware. Idempotent.
    fn cleanup(&mut self);
}

/// Output line levels, in order A.in1, A.in2, B.in1, B.in2.
pub type DrivePattern = [bool; 4];

const H: bool = true;
const L: bool = false;

/// H-bridge input levels for each movement.
pub fn drive_pattern(command: MotorCommand) -> DrivePattern {
    match command {
        MotorCommand::Forward => [H, L, L, H],
        MotorCommand::Backward => [L, H, H, L],
        MotorCommand::Left => [H, L, H, L],
        MotorCommand::Right => [L, H, L, H],
        MotorCommand::Stop => [L, L, L, L],
    }
}

/// Four digital output lines driving the motor bridges.
pub trait PinBank {
    /// Sets all four lines at once, in drive-pattern order.
    fn write(&mut self, levels: DrivePattern) -> Result<(), ActuatorError>;

    /// Releases the lines back to the system. Called at most once.
    fn release(&mut self);
}

/// Differential-drive actuator over a [`PinBank`].
pub struct MotorController<P: PinBank> {
    bank: Option<P>,
}

impl<P: PinBank> MotorController<P> {
    /// Takes ownership of the bank and drives every line low.
    pub fn new(mut bank: P) -> Result<Self, ActuatorError> {
        bank.write(drive_pattern(MotorCommand::Stop))?;
        Ok(Self { bank: Some(bank) })
    }

    pub fn is_released(&self) -> bool {
        self.bank.is_none()
    }
}

impl<P: PinBank> ActuatorSink for MotorController<P> {
    fn apply(&mut self, command: MotorCommand) -> Result<(), ActuatorError> {
        let Some(bank) = self.bank.as_mut() else {
            return match command {
                MotorCommand::Stop => Ok(()),
                _ => Err(ActuatorError::Released),
            };
        };

        bank.write(drive_pattern(MotorCommand::Stop))?;
        if command != MotorCommand::Stop {
            bank.write(drive_pattern(command))?;
        }
        debug!(?command, "motors driven");
        Ok(())
    }

    fn cleanup(&mut self) {
        if let Some(mut bank) = self.bank.take() {
            // Release regardless of whether the final stop write succeeded.
            let _ = bank.write(drive_pattern(MotorCommand::Stop));
            bank.release();
            info!("motor outputs released");
        }
    }
}

impl<P: PinBank> Drop for MotorController<P> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
