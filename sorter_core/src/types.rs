//! Values flowing through the pipeline.

use std::fmt;

/// One poll of the sensor, stamped with the clock reading taken right after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Milliseconds since the sampling epoch.
    pub timestamp_ms: u64,
    pub magnitude: i32,
}

impl Sample {
    #[inline]
    pub fn new(timestamp_ms: u64, magnitude: i32) -> Self {
        Self {
            timestamp_ms,
            magnitude,
        }
    }
}

/// A closed capture window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakEvent {
    pub peak_magnitude: i32,
    /// Timestamp of the sample that closed the window.
    pub completed_at_ms: u64,
}

/// Material category assigned to a peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Unknown,
    Plastic,
    Glass,
    Metal,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Unknown,
        Category::Plastic,
        Category::Glass,
        Category::Metal,
    ];

    /// Stable lowercase name (JSON output, config keys).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Unknown => "unknown",
            Category::Plastic => "plastic",
            Category::Glass => "glass",
            Category::Metal => "metal",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Unknown => "UNKNOWN",
            Category::Plastic => "PLASTIC",
            Category::Glass => "GLASS",
            Category::Metal => "METAL",
        })
    }
}
