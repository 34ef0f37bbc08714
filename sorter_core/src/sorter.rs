//! Sorting pipeline: engine, classifier, policy, actuator.

use sorter_traits::Actuator;

use crate::classifier::Classifier;
use crate::engine::PeakCaptureEngine;
use crate::error::Result;
use crate::policy::ActuationPolicy;
use crate::status::SortEvent;
use crate::types::Sample;

pub struct Sorter<A: Actuator> {
    engine: PeakCaptureEngine,
    classifier: Classifier,
    policy: ActuationPolicy,
    actuator: A,
}

impl<A: Actuator> Sorter<A> {
    pub fn new(
        engine: PeakCaptureEngine,
        classifier: Classifier,
        policy: ActuationPolicy,
        actuator: A,
    ) -> Self {
        Self {
            engine,
            classifier,
            policy,
            actuator,
        }
    }

    /// Command the initial position regardless of remembered state.
    pub fn home(&mut self) -> Result<()> {
        self.policy.home(&mut self.actuator)
    }

    /// One atomic step: sample in, at most one classified and actuated peak out.
    pub fn process(&mut self, sample: Sample) -> Result<Option<SortEvent>> {
        let Some(peak) = self.engine.process(sample) else {
            return Ok(None);
        };
        let category = self.classifier.classify(peak.peak_magnitude);
        let target = self.policy.target_position(category);
        let commanded = self.policy.apply(category, &mut self.actuator)?;
        let event = SortEvent {
            peak,
            category,
            target,
            commanded,
            position: self.policy.last_commanded(),
        };
        tracing::info!(
            peak = peak.peak_magnitude,
            category = category.as_str(),
            moved = commanded.is_some(),
            position = event.position,
            "peak sorted"
        );
        Ok(Some(event))
    }

    pub fn engine(&self) -> &PeakCaptureEngine {
        &self.engine
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn policy(&self) -> &ActuationPolicy {
        &self.policy
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaptureCfg;
    use crate::mocks::RecordingActuator;
    use crate::types::Category;

    #[test]
    fn metal_peak_moves_actuator() {
        let act = RecordingActuator::new();
        let mut s = Sorter::new(
            PeakCaptureEngine::new(CaptureCfg::default()),
            Classifier::default(),
            ActuationPolicy::default(),
            act.clone(),
        );
        assert!(s.process(Sample::new(0, 560)).unwrap().is_none());
        assert!(s.process(Sample::new(20, 600)).unwrap().is_none());
        let ev = s.process(Sample::new(50, 500)).unwrap().unwrap();
        assert_eq!(ev.category, Category::Metal);
        assert_eq!(ev.peak.peak_magnitude, 600);
        assert_eq!(ev.commanded, Some(125));
        assert_eq!(act.moves(), vec![125]);
    }
}

impl<A: Actuator> std::fmt::Debug for Sorter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sorter")
            .field("engine", &self.engine)
            .field("classifier", &self.classifier)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
