//! Test and helper doubles for sorter_core.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sorter_traits::{Actuator, BoxError, Sensor};

/// Replays a fixed list of readings, then holds the last one (or 0 if empty).
pub struct ScriptedSensor {
    values: Vec<i32>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedSensor {
    pub fn new(values: Vec<i32>) -> Self {
        Self {
            values,
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared read counter; stays valid after the sensor is moved away.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        self.reads.clone()
    }
}

impl Sensor for ScriptedSensor {
    fn read(&mut self) -> Result<i32, BoxError> {
        let i = self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .values
            .get(i)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0))
    }
}

/// A sensor whose bus is gone.
pub struct FailingSensor;

impl Sensor for FailingSensor {
    fn read(&mut self) -> Result<i32, BoxError> {
        Err(Box::new(std::io::Error::other("sensor bus unavailable")))
    }
}

/// Records every commanded position into a shared log.
#[derive(Clone, Default)]
pub struct RecordingActuator {
    log: Arc<Mutex<Vec<i32>>>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> Vec<i32> {
        self.log.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Actuator for RecordingActuator {
    fn move_to(&mut self, position: i32) -> Result<(), BoxError> {
        self.log
            .lock()
            .map_err(|_| "actuator log poisoned")?
            .push(position);
        Ok(())
    }
}
