//! Per-sample outcomes reported by the pipelines.

use std::fmt;

use crate::types::{Category, PeakEvent};

/// One classified peak and what the actuator did about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortEvent {
    pub peak: PeakEvent,
    pub category: Category,
    /// Configured position for the category, if any. Shown even when the
    /// actuator is already there.
    pub target: Option<i32>,
    /// Position actually commanded; `None` when already there or unmapped.
    pub commanded: Option<i32>,
    /// Last commanded position after this event.
    pub position: i32,
}

impl fmt::Display for SortEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Peak: {} -> {}", self.peak.peak_magnitude, self.category)?;
        match self.target {
            Some(p) => write!(f, " (->{p}°)"),
            None => write!(f, " (no move)"),
        }
    }
}

/// Calibration pipeline outcome for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    /// Still waiting for a peak.
    Collecting,
    /// A peak was captured and stored.
    Recorded(PeakEvent),
    /// Capacity reached; no further samples are consumed.
    Full,
}
