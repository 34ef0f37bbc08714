//! Runtime configuration for the core pipeline.
//!
//! Separate from the TOML schema in `sorter_config`; see `conversions` for the bridge.

use crate::classifier::CategoryRange;
use crate::policy::PositionMap;
use crate::types::Category;

/// Peak capture timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureCfg {
    /// `magnitude >= trigger_threshold` opens a window.
    pub trigger_threshold: i32,
    /// Window length measured from the trigger sample.
    pub peak_window_ms: u64,
    /// Dead time after a window closes. Inclusive: the sample at exactly
    /// `cooldown_ms` re-arms the engine.
    pub cooldown_ms: u64,
}

impl Default for CaptureCfg {
    fn default() -> Self {
        Self {
            trigger_threshold: 527,
            peak_window_ms: 50,
            cooldown_ms: 3000,
        }
    }
}

/// Classification ranges in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierCfg {
    pub ranges: Vec<CategoryRange>,
}

impl Default for ClassifierCfg {
    fn default() -> Self {
        Self {
            ranges: vec![
                CategoryRange::new(555, 650, Category::Metal),
                CategoryRange::new(540, 554, Category::Glass),
                CategoryRange::new(527, 539, Category::Plastic),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationCfg {
    /// Position the actuator is sent to at startup and assumed to hold.
    pub initial_position: i32,
    pub positions: PositionMap,
}

impl Default for ActuationCfg {
    fn default() -> Self {
        Self {
            initial_position: 100,
            positions: PositionMap::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderCfg {
    pub capacity: usize,
}

impl Default for RecorderCfg {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// How samples are acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingCfg {
    /// Poll on a dedicated thread instead of inline. The thread reads ahead
    /// by at most `channel_capacity` samples until the source is closed.
    pub threaded: bool,
    /// Pause between polls; 0 busy-polls.
    pub poll_interval_us: u64,
    /// Hand-off channel bound when threaded.
    pub channel_capacity: usize,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            threaded: false,
            poll_interval_us: 0,
            channel_capacity: 64,
        }
    }
}
