//! Sensor and actuator backends for the sorter.
//!
//! The simulated pair is always available; the Raspberry Pi backend
//! (MCP3008 ADC + PWM servo) is behind the `hardware` feature.
pub mod error;
pub mod util;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod mcp3008;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod servo;

use sorter_traits::{Actuator, BoxError, Clock, Sensor};
use std::time::Instant;

/// Repeating synthetic excitation used by the simulated sensor.
///
/// Every `period_ms` a triangular pulse of `pulse_ms` rises from `baseline`
/// to the next entry of `peaks` (cycled) and falls back again. The pulse
/// starts `offset_ms` into each period.
#[derive(Debug, Clone)]
pub struct PulseTrain {
    pub baseline: i32,
    pub period_ms: u64,
    pub offset_ms: u64,
    pub pulse_ms: u64,
    pub peaks: Vec<i32>,
}

impl Default for PulseTrain {
    fn default() -> Self {
        Self {
            baseline: 500,
            period_ms: 4000,
            offset_ms: 500,
            pulse_ms: 30,
            peaks: vec![600, 545, 530, 700, 560, 532],
        }
    }
}

impl PulseTrain {
    /// Signal level at `t_ms` since the sensor's epoch.
    pub fn level_at(&self, t_ms: u64) -> i32 {
        if self.peaks.is_empty() || self.period_ms == 0 || self.pulse_ms == 0 {
            return self.baseline;
        }
        let k = t_ms / self.period_ms;
        let phase = t_ms % self.period_ms;
        if phase < self.offset_ms || phase >= self.offset_ms + self.pulse_ms {
            return self.baseline;
        }
        let idx = usize::try_from(k % self.peaks.len() as u64).unwrap_or(0);
        let peak = i64::from(self.peaks[idx]);
        let base = i64::from(self.baseline);
        let half = (self.pulse_ms / 2).max(1) as i64;
        let dist = ((phase - self.offset_ms) as i64 - half).abs().min(half);
        let level = peak - (peak - base) * dist / half;
        i32::try_from(level).unwrap_or(self.baseline)
    }
}

/// Simulated analog front end that plays a `PulseTrain` against a clock.
pub struct SimulatedSensor<C: Clock> {
    clock: C,
    epoch: Instant,
    train: PulseTrain,
}

impl<C: Clock> SimulatedSensor<C> {
    pub fn new(clock: C, train: PulseTrain) -> Self {
        let epoch = clock.now();
        Self {
            clock,
            epoch,
            train,
        }
    }
}

impl<C: Clock> Sensor for SimulatedSensor<C> {
    fn read(&mut self) -> Result<i32, BoxError> {
        let t = self.clock.ms_since(self.epoch);
        Ok(self.train.level_at(t))
    }
}

/// Simulated actuator: remembers where it was told to go.
#[derive(Debug, Default)]
pub struct SimulatedActuator {
    position: Option<i32>,
    moves: usize,
}

impl SimulatedActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded position, `None` before the first command.
    pub fn position(&self) -> Option<i32> {
        self.position
    }

    /// Number of move commands received.
    pub fn moves(&self) -> usize {
        self.moves
    }
}

impl Actuator for SimulatedActuator {
    fn move_to(&mut self, position: i32) -> Result<(), BoxError> {
        tracing::debug!(position, "simulated actuator move");
        self.position = Some(position);
        self.moves += 1;
        Ok(())
    }
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hw::{HardwareActuator, HardwareSensor};

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod hw {
    use super::*;
    use crate::error::HwError;

    pub struct HardwareSensor {
        adc: crate::mcp3008::Mcp3008,
    }

    impl HardwareSensor {
        pub fn new(bus: u8, slave_select: u8, clock_hz: u32, channel: u8) -> Result<Self, HwError> {
            let adc = crate::mcp3008::Mcp3008::new(bus, slave_select, clock_hz, channel)?;
            Ok(Self { adc })
        }
    }

    impl Sensor for HardwareSensor {
        fn read(&mut self) -> Result<i32, BoxError> {
            self.adc.read().map_err(|e| {
                tracing::error!(error = %e, "adc read failed");
                Box::new(e) as BoxError
            })
        }
    }

    pub struct HardwareActuator {
        servo: crate::servo::Servo,
    }

    impl HardwareActuator {
        pub fn new(pin: u8, min_pulse_us: u64, max_pulse_us: u64) -> Result<Self, HwError> {
            let servo = crate::servo::Servo::new(pin, min_pulse_us, max_pulse_us)?;
            Ok(Self { servo })
        }
    }

    impl Actuator for HardwareActuator {
        fn move_to(&mut self, position: i32) -> Result<(), BoxError> {
            self.servo.write(position).map_err(|e| {
                tracing::error!(error = %e, position, "servo write failed");
                Box::new(e) as BoxError
            })
        }
    }
}
