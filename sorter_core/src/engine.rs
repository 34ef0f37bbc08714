//! Peak capture state machine.
//!
//! Samples arrive in non-decreasing timestamp order. A sample at or above the
//! trigger threshold opens a window; the largest magnitude seen while the window
//! is open becomes the event's peak. The first sample at or past the window end
//! closes it (its magnitude is not part of the window) and starts a cooldown
//! during which nothing can trigger.

use crate::config::CaptureCfg;
use crate::types::{PeakEvent, Sample};
use crate::util::elapsed_ms;

/// Engine state. Only `ActiveWindow` carries a running peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    ActiveWindow {
        window_start_ms: u64,
        running_peak: i32,
    },
    Cooldown {
        cooldown_start_ms: u64,
    },
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::ActiveWindow { .. } => "active_window",
            EngineState::Cooldown { .. } => "cooldown",
        }
    }
}

/// Pure transition: `(state, sample) -> (state', event?)`.
pub fn transition(
    cfg: &CaptureCfg,
    state: EngineState,
    sample: Sample,
) -> (EngineState, Option<PeakEvent>) {
    let ts = sample.timestamp_ms;
    let mag = sample.magnitude;
    match state {
        EngineState::Idle => {
            if mag >= cfg.trigger_threshold {
                (
                    EngineState::ActiveWindow {
                        window_start_ms: ts,
                        running_peak: mag,
                    },
                    None,
                )
            } else {
                (EngineState::Idle, None)
            }
        }
        EngineState::ActiveWindow {
            window_start_ms,
            running_peak,
        } => {
            if elapsed_ms(ts, window_start_ms) < cfg.peak_window_ms {
                (
                    EngineState::ActiveWindow {
                        window_start_ms,
                        running_peak: running_peak.max(mag),
                    },
                    None,
                )
            } else {
                (
                    EngineState::Cooldown {
                        cooldown_start_ms: ts,
                    },
                    Some(PeakEvent {
                        peak_magnitude: running_peak,
                        completed_at_ms: ts,
                    }),
                )
            }
        }
        EngineState::Cooldown { cooldown_start_ms } => {
            // The re-arming sample is consumed; it cannot trigger on its own.
            if elapsed_ms(ts, cooldown_start_ms) >= cfg.cooldown_ms {
                (EngineState::Idle, None)
            } else {
                (state, None)
            }
        }
    }
}

/// Stateful wrapper around [`transition`].
#[derive(Debug, Clone)]
pub struct PeakCaptureEngine {
    cfg: CaptureCfg,
    state: EngineState,
}

impl PeakCaptureEngine {
    pub fn new(cfg: CaptureCfg) -> Self {
        Self {
            cfg,
            state: EngineState::Idle,
        }
    }

    pub fn config(&self) -> &CaptureCfg {
        &self.cfg
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Back to `Idle`, discarding any open window.
    pub fn reset(&mut self) {
        self.state = EngineState::Idle;
    }

    /// Feed one sample; returns an event when a window closes.
    pub fn process(&mut self, sample: Sample) -> Option<PeakEvent> {
        let prev = self.state;
        let (next, event) = transition(&self.cfg, prev, sample);
        if std::mem::discriminant(&prev) != std::mem::discriminant(&next) {
            tracing::trace!(
                from = prev.name(),
                to = next.name(),
                ts = sample.timestamp_ms,
                magnitude = sample.magnitude,
                "engine transition"
            );
        }
        if let Some(ev) = event {
            tracing::debug!(
                peak = ev.peak_magnitude,
                at_ms = ev.completed_at_ms,
                "peak captured"
            );
        }
        self.state = next;
        event
    }
}
