use line_follower::actuator::DrivePattern;
use line_follower::{ActuatorError, MotorPins, PinBank};
use rppal::gpio::{Gpio, Level, OutputPin};

/// The four BCM output lines of the motor bridges on a Raspberry Pi.
pub struct GpioBank {
    pins: Vec<OutputPin>,
}

impl GpioBank {
    pub fn open(pins: MotorPins) -> anyhow::Result<Self> {
        let gpio = Gpio::new()?;
        let pins = pins
            .as_array()
            .into_iter()
            .map(|pin| Ok(gpio.get(pin)?.into_output_low()))
            .collect::<Result<Vec<_>, rppal::gpio::Error>>()?;
        Ok(Self { pins })
    }
}

impl PinBank for GpioBank {
    fn write(&mut self, levels: DrivePattern) -> Result<(), ActuatorError> {
        if self.pins.is_empty() {
            return Err(ActuatorError::Released);
        }
        for (pin, high) in self.pins.iter_mut().zip(levels) {
            pin.write(if high { Level::High } else { Level::Low });
        }
        Ok(())
    }

    fn release(&mut self) {
        // Dropping an OutputPin resets it to its original mode.
        self.pins.clear();
    }
}
