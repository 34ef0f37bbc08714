#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Peak capture, classification and sorting logic (hardware-agnostic).
//!
//! All hardware interaction goes through `sorter_traits::Sensor`,
//! `sorter_traits::Actuator` and `sorter_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Engine**: three-state peak capture automaton (`engine` module)
//! - **Classifier**: ordered inclusive ranges, first match wins (`classifier`)
//! - **Policy**: category to position, skipping redundant moves (`policy`)
//! - **Recorder**: bounded peak buffer with a delimited text dump (`recorder`)
//! - **Sources**: direct polling, trace replay, threaded sampler (`source`, `sampler`)
//! - **Runners**: sorting and calibration driver loops (`runner`)
//!
//! Timestamps are integer milliseconds since the sampling epoch; elapsed
//! time is computed with saturating subtraction.

pub mod atomic;
pub mod builder;
pub mod calibrator;
pub mod classifier;
pub mod config;
pub mod conversions;
pub mod engine;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod policy;
pub mod recorder;
pub mod runner;
pub mod sampler;
pub mod sorter;
pub mod source;
pub mod status;
pub mod types;
pub mod util;

pub use builder::{DynSorter, Missing, Set, SorterBuilder, build_calibrator, build_sorter};
pub use calibrator::Calibrator;
pub use classifier::{CategoryRange, Classifier};
pub use config::{ActuationCfg, CaptureCfg, ClassifierCfg, RecorderCfg, SamplingCfg};
pub use engine::{EngineState, PeakCaptureEngine};
pub use error::{BuildError, SorterError};
pub use policy::{ActuationPolicy, PositionMap};
pub use recorder::CalibrationRecorder;
pub use runner::{
    CalibrationOutcome, RunOptions, SortSummary, open_source, run_calibration, run_sorting,
};
pub use sampler::Sampler;
pub use sorter::Sorter;
pub use source::{Poller, SampleSource, TraceSource};
pub use status::{CalibrationStatus, SortEvent};
pub use types::{Category, PeakEvent, Sample};
