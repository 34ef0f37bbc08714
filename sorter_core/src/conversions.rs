//! `From` implementations bridging `sorter_config` types to `sorter_core` types.

use crate::classifier::CategoryRange;
use crate::config::{ActuationCfg, CaptureCfg, ClassifierCfg, RecorderCfg, SamplingCfg};
use crate::policy::PositionMap;
use crate::types::{Category, Sample};

impl From<sorter_config::Material> for Category {
    fn from(m: sorter_config::Material) -> Self {
        match m {
            sorter_config::Material::Plastic => Category::Plastic,
            sorter_config::Material::Glass => Category::Glass,
            sorter_config::Material::Metal => Category::Metal,
        }
    }
}

impl From<&sorter_config::CaptureCfg> for CaptureCfg {
    fn from(c: &sorter_config::CaptureCfg) -> Self {
        Self {
            trigger_threshold: c.trigger_threshold,
            peak_window_ms: c.peak_window_ms,
            cooldown_ms: c.cooldown_ms,
        }
    }
}

impl From<&sorter_config::RangeCfg> for CategoryRange {
    fn from(r: &sorter_config::RangeCfg) -> Self {
        CategoryRange::new(r.low, r.high, r.category.into())
    }
}

impl From<&sorter_config::ClassifierCfg> for ClassifierCfg {
    fn from(c: &sorter_config::ClassifierCfg) -> Self {
        Self {
            ranges: c.ranges.iter().map(CategoryRange::from).collect(),
        }
    }
}

impl From<&sorter_config::PositionsCfg> for PositionMap {
    fn from(p: &sorter_config::PositionsCfg) -> Self {
        PositionMap {
            plastic: p.plastic,
            glass: p.glass,
            metal: p.metal,
        }
    }
}

impl From<&sorter_config::ActuatorCfg> for ActuationCfg {
    fn from(a: &sorter_config::ActuatorCfg) -> Self {
        Self {
            initial_position: a.initial_position,
            positions: (&a.positions).into(),
        }
    }
}

impl From<&sorter_config::CalibrationCfg> for RecorderCfg {
    fn from(c: &sorter_config::CalibrationCfg) -> Self {
        Self {
            capacity: c.capacity,
        }
    }
}

impl From<&sorter_config::SamplingCfg> for SamplingCfg {
    fn from(s: &sorter_config::SamplingCfg) -> Self {
        Self {
            threaded: matches!(s.mode, sorter_config::SamplingMode::Sampler),
            poll_interval_us: s.poll_interval_us,
            channel_capacity: s.channel_capacity,
        }
    }
}

impl From<sorter_config::TraceRow> for Sample {
    fn from(r: sorter_config::TraceRow) -> Self {
        Sample::new(r.timestamp_ms, r.raw)
    }
}
