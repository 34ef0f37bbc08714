//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[inline]
pub fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

#[derive(Parser, Debug)]
#[command(name = "sorter", version, about = "Peak-capture material sorter")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/sorter_config.toml")]
    pub config: PathBuf,

    /// Emit JSON lines (events, summaries, errors, logs) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Log level (error|warn|info|debug|trace); overrides logging.level, RUST_LOG overrides both
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect, classify and sort peaks until stopped
    Sort {
        /// Replay a recorded `timestamp_ms,raw` CSV instead of polling the sensor
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Stop after this many sorted peaks
        #[arg(long, value_name = "N")]
        max_events: Option<u64>,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority and calls mlockall(MCL_CURRENT|MCL_FUTURE) to keep the polling loop free of page faults. May require elevated privileges or a raised memlock ulimit; failures are logged as warnings and the run continues."
        )]
        rt: bool,
        /// SCHED_FIFO priority for --rt (clamped to the platform range)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
    },
    /// Record peak magnitudes until the buffer is full, then dump them
    Calibrate {
        /// Replay a recorded `timestamp_ms,raw` CSV instead of polling the sensor
        #[arg(long, value_name = "FILE")]
        trace: Option<PathBuf>,
        /// Number of peaks to collect (overrides calibration.capacity)
        #[arg(long, value_name = "N")]
        capacity: Option<usize>,
        /// Also write the dump to this file (overrides calibration.output)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Stream raw sensor readings as `timestamp_ms,raw,volts` CSV
    Monitor {
        /// Stop after this many readings
        #[arg(long, value_name = "N")]
        count: Option<u64>,
        /// Pause between readings in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 10)]
        interval_ms: u64,
    },
    /// Summarise a calibration dump against the configured ranges
    Analyze {
        /// File containing a START_DATA_CAPTURE/END_DATA_CAPTURE dump
        #[arg(long, value_name = "FILE")]
        dump: PathBuf,
    },
    /// Validate config and initialise the backend
    SelfCheck,
}
