//! Background sampling thread.
//!
//! Owns the sensor and clock, stamps each reading and pushes it through a
//! bounded channel. Sends block when the consumer lags, so samples are never
//! dropped or reordered. A sensor error is forwarded once and ends the thread.
//!
//! The thread reads ahead of the consumer by up to the channel capacity.
//! `close` (or drop) stops it and joins, so no sensor read happens afterwards.
//!
//! Each `Sampler` spawns exactly one thread, shut down and joined on drop.
use crossbeam_channel as xch;
use sorter_traits::{Clock, Sensor};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::error::{Result, SorterError};
use crate::hw_error::map_hw_error;
use crate::source::SampleSource;
use crate::types::Sample;

type Item = std::result::Result<Sample, SorterError>;

pub struct Sampler {
    rx: Option<xch::Receiver<Item>>,
    produced: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    pub fn spawn<S, C>(mut sensor: S, clock: C, interval: Duration, capacity: usize) -> Self
    where
        S: Sensor + Send + 'static,
        C: Clock + Send + 'static,
    {
        let (tx, rx) = xch::bounded::<Item>(capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let produced = Arc::new(AtomicU64::new(0));
        let produced_clone = produced.clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            let mut first = true;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }
                if !first && !interval.is_zero() {
                    clock.sleep(interval);
                }
                first = false;

                match sensor.read() {
                    Ok(v) => {
                        let sample = Sample::new(clock.ms_since(epoch), v);
                        // Consumer gone
                        if tx.send(Ok(sample)).is_err() {
                            tracing::debug!("sampler consumer disconnected, exiting thread");
                            break;
                        }
                        produced_clone.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        let mapped = map_hw_error(&*e);
                        tracing::error!(error = %mapped, "sensor read failed, stopping sampler");
                        let _ = tx.send(Err(mapped));
                        break;
                    }
                }
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx: Some(rx),
            produced,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Samples handed to the channel so far.
    pub fn produced(&self) -> u64 {
        self.produced.load(Ordering::Relaxed)
    }

    /// Ask the thread to stop after its current read.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl SampleSource for Sampler {
    fn next_sample(&mut self) -> Result<Option<Sample>> {
        let Some(rx) = self.rx.as_ref() else {
            return Ok(None);
        };
        match rx.recv() {
            Ok(Ok(s)) => Ok(Some(s)),
            Ok(Err(e)) => Err(eyre::Report::new(e)),
            Err(xch::RecvError) => Ok(None),
        }
    }

    fn close(&mut self) {
        self.shutdown_and_join();
    }
}

impl Sampler {
    fn shutdown_and_join(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Unblocks a thread parked in `send` on a full channel.
        drop(self.rx.take());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("sampler thread joined"),
                Err(e) => tracing::warn!(?e, "sampler thread panicked during shutdown"),
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
