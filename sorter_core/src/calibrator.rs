//! Calibration pipeline: engine feeding a bounded recorder.

use crate::engine::PeakCaptureEngine;
use crate::recorder::CalibrationRecorder;
use crate::status::CalibrationStatus;
use crate::types::Sample;

#[derive(Debug, Clone)]
pub struct Calibrator {
    engine: PeakCaptureEngine,
    recorder: CalibrationRecorder,
}

impl Calibrator {
    pub fn new(engine: PeakCaptureEngine, recorder: CalibrationRecorder) -> Self {
        Self { engine, recorder }
    }

    /// Feed one sample. Once full, samples are refused without touching the engine.
    pub fn process(&mut self, sample: Sample) -> CalibrationStatus {
        if self.recorder.is_full() {
            return CalibrationStatus::Full;
        }
        match self.engine.process(sample) {
            Some(ev) => {
                self.recorder.record(ev.peak_magnitude);
                tracing::info!(
                    peak = ev.peak_magnitude,
                    recorded = self.recorder.len(),
                    capacity = self.recorder.capacity(),
                    "peak recorded"
                );
                CalibrationStatus::Recorded(ev)
            }
            None => CalibrationStatus::Collecting,
        }
    }

    pub fn is_full(&self) -> bool {
        self.recorder.is_full()
    }

    pub fn recorder(&self) -> &CalibrationRecorder {
        &self.recorder
    }

    pub fn engine(&self) -> &PeakCaptureEngine {
        &self.engine
    }

    pub fn into_recorder(self) -> CalibrationRecorder {
        self.recorder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaptureCfg;
    use crate::engine::EngineState;

    #[test]
    fn full_calibrator_ignores_samples() {
        let mut c = Calibrator::new(
            PeakCaptureEngine::new(CaptureCfg::default()),
            CalibrationRecorder::new(1),
        );
        c.process(Sample::new(0, 600));
        assert!(matches!(
            c.process(Sample::new(50, 0)),
            CalibrationStatus::Recorded(_)
        ));
        assert!(c.is_full());
        assert_eq!(c.process(Sample::new(5000, 700)), CalibrationStatus::Full);
        assert!(matches!(c.engine().state(), EngineState::Cooldown { .. }));
    }
}
