//! Where samples come from.
//!
//! A source hands out timestamped samples one at a time; `Ok(None)` means it
//! has nothing more to give (trace exhausted, sampler thread gone).

use std::time::{Duration, Instant};

use sorter_traits::{Clock, Sensor};

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::types::Sample;

pub trait SampleSource {
    fn next_sample(&mut self) -> Result<Option<Sample>>;

    /// Stop acquiring. Sources that poll on demand have nothing to do.
    fn close(&mut self) {}
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        (**self).next_sample()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// Direct polling: read the sensor, then the clock, on every call.
pub struct Poller<S, C> {
    sensor: S,
    clock: C,
    epoch: Instant,
    interval: Duration,
    primed: bool,
}

impl<S: Sensor, C: Clock> Poller<S, C> {
    /// Timestamps count from the moment the poller is created.
    pub fn new(sensor: S, clock: C) -> Self {
        let epoch = clock.now();
        Self::with_epoch(sensor, clock, epoch)
    }

    pub fn with_epoch(sensor: S, clock: C, epoch: Instant) -> Self {
        Self {
            sensor,
            clock,
            epoch,
            interval: Duration::ZERO,
            primed: false,
        }
    }

    /// Pause between consecutive polls. Zero busy-polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    pub fn into_parts(self) -> (S, C) {
        (self.sensor, self.clock)
    }
}

impl<S: Sensor, C: Clock> SampleSource for Poller<S, C> {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        if self.primed && !self.interval.is_zero() {
            self.clock.sleep(self.interval);
        }
        self.primed = true;
        let magnitude = self
            .sensor
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        let ts = self.clock.ms_since(self.epoch);
        Ok(Some(Sample::new(ts, magnitude)))
    }
}

/// Replays recorded samples in order.
#[derive(Debug, Clone)]
pub struct TraceSource {
    samples: std::vec::IntoIter<Sample>,
}

impl TraceSource {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples: samples.into_iter(),
        }
    }

    pub fn from_rows(rows: Vec<sorter_config::TraceRow>) -> Self {
        Self::new(rows.into_iter().map(Sample::from).collect())
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleSource for TraceSource {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        Ok(self.samples.next())
    }
}
