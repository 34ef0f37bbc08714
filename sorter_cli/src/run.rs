//! Command implementations: config loading, backend assembly and the run loops.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use serde_json::json;
use sorter_config::Config;
use sorter_core::error::{Result, SorterError};
use sorter_core::hw_error::map_hw_error;
use sorter_core::util::raw_to_volts;
use sorter_core::{
    ActuationCfg, CalibrationOutcome, CaptureCfg, Category, Classifier, ClassifierCfg,
    RecorderCfg, RunOptions, SampleSource, SamplingCfg, SortEvent, TraceSource, build_calibrator,
    build_sorter, open_source, run_calibration, run_sorting,
};
use sorter_traits::{Actuator, Clock, MonotonicClock, Sensor};

use crate::cli::json_mode;
use crate::rt::setup_rt_once;

/// Read and validate the config; a missing file yields the built-in defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| SorterError::Config(format!("read {}: {e}", path.display())))?;
    let cfg = sorter_config::load_toml(&text).map_err(|e: toml::de::Error| {
        SorterError::Config(format!("parse {}: {}", path.display(), e.message()))
    })?;
    cfg.validate()
        .map_err(|e| SorterError::Config(e.to_string()))?;
    Ok(cfg)
}

type DynSensor = Box<dyn Sensor + Send>;

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_sensor(cfg: &Config) -> Result<DynSensor> {
    let s = sorter_hardware::HardwareSensor::new(
        cfg.pins.spi_bus,
        cfg.pins.spi_ss,
        cfg.hardware.spi_clock_hz,
        cfg.pins.adc_channel,
    )
    .map_err(|e| eyre::Report::new(map_hw_error(&e)))
    .wrap_err("open MCP3008")?;
    Ok(Box::new(s))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_sensor(_cfg: &Config) -> Result<DynSensor> {
    let s = sorter_hardware::SimulatedSensor::new(
        MonotonicClock::new(),
        sorter_hardware::PulseTrain::default(),
    );
    Ok(Box::new(s))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn open_actuator(cfg: &Config) -> Result<Box<dyn Actuator>> {
    let a = sorter_hardware::HardwareActuator::new(
        cfg.pins.servo,
        cfg.hardware.servo_min_pulse_us,
        cfg.hardware.servo_max_pulse_us,
    )
    .map_err(|e| eyre::Report::new(map_hw_error(&e)))
    .wrap_err("open servo")?;
    Ok(Box::new(a))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn open_actuator(_cfg: &Config) -> Result<Box<dyn Actuator>> {
    Ok(Box::new(sorter_hardware::SimulatedActuator::new()))
}

fn backend_name() -> &'static str {
    if cfg!(all(feature = "hardware", target_os = "linux")) {
        "hardware"
    } else {
        "simulation"
    }
}

/// Trace replay when a file is given, otherwise live sampling per `[sampling]`.
fn open_samples(cfg: &Config, trace: Option<&Path>) -> Result<Box<dyn SampleSource>> {
    if let Some(path) = trace {
        let rows = sorter_config::load_trace_csv(path)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "replaying trace");
        return Ok(Box::new(TraceSource::from_rows(rows)));
    }
    let sampling = SamplingCfg::from(&cfg.sampling);
    Ok(open_source(open_sensor(cfg)?, MonotonicClock::new(), &sampling))
}

fn event_json(ev: &SortEvent) -> serde_json::Value {
    json!({
        "event": "sort",
        "peak": ev.peak.peak_magnitude,
        "completed_at_ms": ev.peak.completed_at_ms,
        "category": ev.category.as_str(),
        "target": ev.target,
        "commanded": ev.commanded,
        "position": ev.position,
    })
}

pub fn run_sort(
    cfg: &Config,
    trace: Option<&Path>,
    max_events: Option<u64>,
    rt: bool,
    rt_prio: Option<i32>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    setup_rt_once(rt, rt_prio);
    let json = json_mode();

    let mut sorter = build_sorter(
        open_actuator(cfg)?,
        CaptureCfg::from(&cfg.capture),
        ClassifierCfg::from(&cfg.classifier),
        ActuationCfg::from(&cfg.actuator),
    )?;
    sorter.home()?;
    let mut source = open_samples(cfg, trace)?;

    let stdout = std::io::stdout();
    if !json {
        writeln!(stdout.lock(), "--- Detector + Sorter (with enforced cooldown) ---")?;
    }
    let summary = run_sorting(
        &mut source,
        &mut sorter,
        &shutdown,
        RunOptions { max_events },
        |ev| {
            let mut out = stdout.lock();
            if json {
                writeln!(out, "{}", event_json(ev))?;
            } else {
                writeln!(out, "{ev}")?;
            }
            out.flush()?;
            Ok(())
        },
    )?;

    if json {
        let counts: serde_json::Map<String, serde_json::Value> = Category::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), json!(summary.count(*c))))
            .collect();
        writeln!(
            stdout.lock(),
            "{}",
            json!({
                "event": "summary",
                "samples": summary.samples,
                "events": summary.events,
                "commands": summary.commands,
                "categories": counts,
                "interrupted": shutdown.load(Ordering::Relaxed),
            })
        )?;
    }
    Ok(())
}

pub fn run_calibrate(
    cfg: &Config,
    trace: Option<&Path>,
    capacity: Option<usize>,
    output: Option<&Path>,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let json = json_mode();
    let capacity = capacity.unwrap_or(cfg.calibration.capacity);
    let mut calibrator = build_calibrator(CaptureCfg::from(&cfg.capture), RecorderCfg { capacity })?;
    let mut source = open_samples(cfg, trace)?;

    let outcome = if json {
        run_calibration(&mut source, &mut calibrator, &shutdown, &mut std::io::sink())?
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "--- Starting Primary Peak Voltage Capture ---")?;
        writeln!(out, "Target Samples: {capacity}")?;
        run_calibration(&mut source, &mut calibrator, &shutdown, &mut out)?
    };

    let recorder = calibrator.recorder();
    let output = output.or_else(|| cfg.calibration.output.as_deref().map(Path::new));
    let mut saved = None;
    if outcome == CalibrationOutcome::Complete
        && let Some(path) = output
    {
        recorder
            .save_dump(path)
            .wrap_err_with(|| format!("write calibration dump {}", path.display()))?;
        tracing::info!(path = %path.display(), "calibration dump saved");
        saved = Some(path.display().to_string());
    }

    let outcome_name = match outcome {
        CalibrationOutcome::Complete => "complete",
        CalibrationOutcome::Interrupted => "interrupted",
        CalibrationOutcome::SourceEnded => "source_ended",
    };
    if json {
        println!(
            "{}",
            json!({
                "event": "calibration",
                "outcome": outcome_name,
                "capacity": capacity,
                "values": recorder.values(),
                "output": saved,
            })
        );
    } else if outcome != CalibrationOutcome::Complete {
        eprintln!(
            "Calibration stopped early ({outcome_name}): {}/{} peaks recorded, no dump written.",
            recorder.len(),
            capacity
        );
    }
    Ok(())
}

pub fn run_monitor(
    cfg: &Config,
    count: Option<u64>,
    interval_ms: u64,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    let mut sensor = open_sensor(cfg)?;
    let clock = MonotonicClock::new();
    let epoch = clock.now();
    let interval = Duration::from_millis(interval_ms);
    let (full_scale, vref) = (cfg.sensor.range_max, cfg.sensor.vref);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "timestamp_ms,raw,volts")?;
    let mut n = 0u64;
    while !shutdown.load(Ordering::Relaxed) && count.is_none_or(|c| n < c) {
        if n > 0 {
            clock.sleep(interval);
        }
        let raw = sensor
            .read()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        let ts = clock.ms_since(epoch);
        writeln!(out, "{ts},{raw},{:.3}", raw_to_volts(raw, full_scale, vref))?;
        out.flush()?;
        n += 1;
    }
    tracing::debug!(readings = n, "monitor stopped");
    Ok(())
}

pub fn run_analyze(cfg: &Config, dump: &Path) -> Result<()> {
    let values = sorter_config::load_peak_dump(dump)?;
    let classifier = Classifier::new(ClassifierCfg::from(&cfg.classifier).ranges)?;
    let mut counts = [0u64; 4];
    for v in &values {
        let idx = Category::ALL
            .iter()
            .position(|c| *c == classifier.classify(*v))
            .unwrap_or(0);
        counts[idx] += 1;
    }
    let min = values.iter().min().copied();
    let max = values.iter().max().copied();
    let mean = if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64)
    };

    if json_mode() {
        let cats: serde_json::Map<String, serde_json::Value> = Category::ALL
            .iter()
            .zip(counts)
            .map(|(c, n)| (c.as_str().to_string(), json!(n)))
            .collect();
        println!(
            "{}",
            json!({
                "count": values.len(),
                "min": min,
                "max": max,
                "mean": mean,
                "categories": cats,
            })
        );
        return Ok(());
    }

    let fmt_opt = |v: Option<i32>| v.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    println!("count: {}", values.len());
    println!("min: {}", fmt_opt(min));
    println!("max: {}", fmt_opt(max));
    println!(
        "mean: {}",
        mean.map_or_else(|| "n/a".to_string(), |m| format!("{m:.1}"))
    );
    for (c, n) in Category::ALL.iter().zip(counts) {
        println!("{c}: {n}");
    }
    Ok(())
}

pub fn self_check(cfg: &Config) -> Result<()> {
    let mut sensor = open_sensor(cfg)?;
    let raw = sensor
        .read()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err("sensor read")?;
    let mut sorter = build_sorter(
        open_actuator(cfg)?,
        CaptureCfg::from(&cfg.capture),
        ClassifierCfg::from(&cfg.classifier),
        ActuationCfg::from(&cfg.actuator),
    )?;
    sorter.home()?;
    if json_mode() {
        println!(
            "{}",
            json!({ "ok": true, "backend": backend_name(), "raw": raw })
        );
    } else {
        println!("OK ({} backend, sensor reads {raw})", backend_name());
    }
    Ok(())
}
