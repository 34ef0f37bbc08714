use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use tracing::debug;

use crate::error::{HwError, Result};
use crate::util::{SERVO_PERIOD_US, angle_to_pulse_us};

/// Hobby servo driven by software PWM on a GPIO pin.
pub struct Servo {
    pin: OutputPin,
    min_pulse_us: u64,
    max_pulse_us: u64,
}

impl Servo {
    pub fn new(pin: u8, min_pulse_us: u64, max_pulse_us: u64) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(format!("open servo pin {pin}: {e}")))?
            .into_output_low();
        Ok(Self {
            pin,
            min_pulse_us,
            max_pulse_us,
        })
    }

    /// Hold the given angle (degrees). PWM keeps running until the next write.
    pub fn write(&mut self, angle: i32) -> Result<()> {
        let pulse_us = angle_to_pulse_us(angle, self.min_pulse_us, self.max_pulse_us);
        debug!(angle, pulse_us, "servo write");
        self.pin
            .set_pwm(
                Duration::from_micros(SERVO_PERIOD_US),
                Duration::from_micros(pulse_us),
            )
            .map_err(|e| HwError::Gpio(e.to_string()))
    }
}

impl Drop for Servo {
    fn drop(&mut self) {
        let _ = self.pin.clear_pwm();
    }
}
