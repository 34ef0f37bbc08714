//! Type-state builder for `Sorter` and generic constructors.
//!
//! The builder enforces at compile time that an actuator is provided before
//! `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;

use sorter_config::MAX_CALIBRATION_CAPACITY;
use sorter_traits::Actuator;

use crate::calibrator::Calibrator;
use crate::classifier::Classifier;
use crate::config::{ActuationCfg, CaptureCfg, ClassifierCfg, RecorderCfg};
use crate::engine::PeakCaptureEngine;
use crate::error::{BuildError, Result};
use crate::policy::ActuationPolicy;
use crate::recorder::CalibrationRecorder;
use crate::sorter::Sorter;

/// Sorter over a boxed actuator, as produced by the builder.
pub type DynSorter = Sorter<Box<dyn Actuator>>;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

pub struct SorterBuilder<A> {
    actuator: Option<Box<dyn Actuator>>,
    capture: Option<CaptureCfg>,
    classifier: Option<ClassifierCfg>,
    actuation: Option<ActuationCfg>,
    _a: PhantomData<A>,
}

impl Default for SorterBuilder<Missing> {
    fn default() -> Self {
        Self {
            actuator: None,
            capture: None,
            classifier: None,
            actuation: None,
            _a: PhantomData,
        }
    }
}

impl DynSorter {
    pub fn builder() -> SorterBuilder<Missing> {
        SorterBuilder::default()
    }
}

fn validate_capture(capture: &CaptureCfg) -> Result<()> {
    if capture.peak_window_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "peak_window_ms must be >= 1",
        )));
    }
    Ok(())
}

/// Validate configuration and assemble a `Sorter`.
///
/// Shared by `SorterBuilder::try_build()` and `build_sorter()`.
fn validate_and_build<A: Actuator>(
    actuator: A,
    capture: CaptureCfg,
    classifier: ClassifierCfg,
    actuation: ActuationCfg,
) -> Result<Sorter<A>> {
    validate_capture(&capture)?;
    let classifier = Classifier::new(classifier.ranges).map_err(eyre::Report::new)?;
    Ok(Sorter::new(
        PeakCaptureEngine::new(capture),
        classifier,
        ActuationPolicy::new(actuation.positions, actuation.initial_position),
        actuator,
    ))
}

impl<A> SorterBuilder<A> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<DynSorter> {
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        validate_and_build(
            actuator,
            self.capture.unwrap_or_default(),
            self.classifier.unwrap_or_default(),
            self.actuation.unwrap_or_default(),
        )
    }

    pub fn with_capture(mut self, capture: CaptureCfg) -> Self {
        self.capture = Some(capture);
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierCfg) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_actuation(mut self, actuation: ActuationCfg) -> Self {
        self.actuation = Some(actuation);
        self
    }
}

impl SorterBuilder<Missing> {
    pub fn with_actuator(self, actuator: impl Actuator + 'static) -> SorterBuilder<Set> {
        SorterBuilder {
            actuator: Some(Box::new(actuator)),
            capture: self.capture,
            classifier: self.classifier,
            actuation: self.actuation,
            _a: PhantomData,
        }
    }
}

impl SorterBuilder<Set> {
    pub fn build(self) -> Result<DynSorter> {
        self.try_build()
    }
}

/// Generic constructor keeping the concrete actuator type.
pub fn build_sorter<A: Actuator>(
    actuator: A,
    capture: CaptureCfg,
    classifier: ClassifierCfg,
    actuation: ActuationCfg,
) -> Result<Sorter<A>> {
    validate_and_build(actuator, capture, classifier, actuation)
}

pub fn build_calibrator(capture: CaptureCfg, recorder: RecorderCfg) -> Result<Calibrator> {
    validate_capture(&capture)?;
    if recorder.capacity == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "capacity must be >= 1",
        )));
    }
    if recorder.capacity > MAX_CALIBRATION_CAPACITY {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "capacity must be <= 1000000",
        )));
    }
    Ok(Calibrator::new(
        PeakCaptureEngine::new(capture),
        CalibrationRecorder::new(recorder.capacity),
    ))
}
