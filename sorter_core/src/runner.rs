//! Driver loops tying a sample source to a pipeline.
//!
//! Each sample is fully processed (classified and acted on, or recorded)
//! before the next one is pulled.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use sorter_traits::Actuator;

use crate::calibrator::Calibrator;
use crate::config::SamplingCfg;
use crate::error::Result;
use crate::sampler::Sampler;
use crate::sorter::Sorter;
use crate::source::{Poller, SampleSource};
use crate::status::{CalibrationStatus, SortEvent};
use crate::types::Category;
use crate::util::poll_interval;

pub const COLLECTED_BANNER: &str = "--- ALL SAMPLES COLLECTED ---";

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after this many sort events.
    pub max_events: Option<u64>,
}

/// Totals for a sorting run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSummary {
    pub samples: u64,
    pub events: u64,
    /// Actuator commands issued (homing excluded).
    pub commands: u64,
    per_category: [u64; 4],
}

impl SortSummary {
    pub fn count(&self, category: Category) -> u64 {
        self.per_category[category.index()]
    }

    fn add(&mut self, ev: &SortEvent) {
        self.events += 1;
        self.per_category[ev.category.index()] += 1;
        if ev.commanded.is_some() {
            self.commands += 1;
        }
    }
}

/// How a calibration run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationOutcome {
    /// Buffer filled and the dump was written.
    Complete,
    /// Shutdown requested before the buffer filled.
    Interrupted,
    /// The source ran dry before the buffer filled.
    SourceEnded,
}

/// Wrap a sensor in the configured acquisition mode.
pub fn open_source<S, C>(sensor: S, clock: C, sampling: &SamplingCfg) -> Box<dyn SampleSource>
where
    S: sorter_traits::Sensor + Send + 'static,
    C: sorter_traits::Clock + Send + 'static,
{
    let interval = poll_interval(sampling.poll_interval_us);
    if sampling.threaded {
        tracing::debug!(capacity = sampling.channel_capacity, "sampling on a dedicated thread");
        Box::new(Sampler::spawn(sensor, clock, interval, sampling.channel_capacity))
    } else {
        Box::new(Poller::new(sensor, clock).with_interval(interval))
    }
}

/// Sort until shutdown, source exhaustion or `max_events`.
///
/// `on_event` sees every emitted event in order; an error from it aborts the run.
pub fn run_sorting<Src, A, F>(
    source: &mut Src,
    sorter: &mut Sorter<A>,
    shutdown: &AtomicBool,
    opts: RunOptions,
    mut on_event: F,
) -> Result<SortSummary>
where
    Src: SampleSource + ?Sized,
    A: Actuator,
    F: FnMut(&SortEvent) -> Result<()>,
{
    let mut summary = SortSummary::default();
    tracing::info!(max_events = ?opts.max_events, "sorting start");
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        if let Some(max) = opts.max_events
            && summary.events >= max
        {
            break;
        }
        let Some(sample) = source.next_sample()? else {
            tracing::info!("sample source ended");
            break;
        };
        summary.samples += 1;
        if let Some(ev) = sorter.process(sample)? {
            summary.add(&ev);
            on_event(&ev)?;
        }
    }
    tracing::info!(
        samples = summary.samples,
        events = summary.events,
        commands = summary.commands,
        "sorting stopped"
    );
    Ok(summary)
}

/// Record peaks until the buffer is full, then write the banner and dump to `out`.
///
/// Capacity is checked before every poll, so a full buffer never pulls another sample.
/// The source is closed once full, which also stops a sampler thread reading ahead.
pub fn run_calibration<Src, W>(
    source: &mut Src,
    calibrator: &mut Calibrator,
    shutdown: &AtomicBool,
    out: &mut W,
) -> Result<CalibrationOutcome>
where
    Src: SampleSource + ?Sized,
    W: Write + ?Sized,
{
    tracing::info!(capacity = calibrator.recorder().capacity(), "calibration start");
    loop {
        if calibrator.is_full() {
            source.close();
            writeln!(out, "\n{COLLECTED_BANNER}")?;
            calibrator.recorder().write_dump(&mut *out)?;
            tracing::info!(recorded = calibrator.recorder().len(), "calibration complete");
            return Ok(CalibrationOutcome::Complete);
        }
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(recorded = calibrator.recorder().len(), "calibration interrupted");
            return Ok(CalibrationOutcome::Interrupted);
        }
        let Some(sample) = source.next_sample()? else {
            tracing::warn!(
                recorded = calibrator.recorder().len(),
                "sample source ended before the buffer filled"
            );
            return Ok(CalibrationOutcome::SourceEnded);
        };
        if let CalibrationStatus::Recorded(ev) = calibrator.process(sample) {
            writeln!(out, "{}", ev.peak_magnitude)?;
            out.flush()?;
        }
    }
}
