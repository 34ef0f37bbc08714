#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema, recorded-trace loader and calibration dump parser for the sorter.
//!
//! - `Config` and its sections are deserialized from TOML and validated. Every
//!   section has defaults matching the stock firmware, so an empty file is valid.
//! - Trace CSV loader enforces headers and monotonic timestamps.
//! - Dump parser reads back the delimited peak list written by a calibration run.
use serde::Deserialize;
use serde::de::Deserializer;

/// First line of a calibration dump.
pub const DUMP_BEGIN: &str = "START_DATA_CAPTURE";
/// Last line of a calibration dump.
pub const DUMP_END: &str = "END_DATA_CAPTURE";
/// Largest number of peaks a calibration run may be asked to collect.
pub const MAX_CALIBRATION_CAPACITY: usize = 1_000_000;

/// Analog front end range (10-bit ADC by default).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorCfg {
    pub range_min: i32,
    pub range_max: i32,
    /// Reference voltage, only used to render volts in `monitor` output.
    pub vref: f32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            range_min: 0,
            range_max: 1023,
            vref: 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureCfg {
    /// Minimum magnitude that opens a peak window.
    pub trigger_threshold: i32,
    /// How long to keep tracking the maximum after the trigger.
    pub peak_window_ms: u64,
    /// Time to ignore the signal after a window closes.
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

/// Configurable material. "unknown" is absent: it is the classifier fallback
/// and owns neither a range nor a position.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Plastic,
    Glass,
    Metal,
}

impl Material {
    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Plastic => "plastic",
            Material::Glass => "glass",
            Material::Metal => "metal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCfg {
    pub category: Material,
    pub low: i32,
    pub high: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierCfg {
    /// Inclusive magnitude ranges in priority order (first match wins). Accepts either:
    /// - array of tables: [{ category = "metal", low = 555, high = 650 }, ...]
    /// - array of tuples: [["metal", 555, 650], ...]
    #[serde(deserialize_with = "de_ranges")]
    pub ranges: Vec<RangeCfg>,
}

impl Default for ClassifierCfg {
    fn default() -> Self {
        Self {
            ranges: vec![
                RangeCfg {
                    category: Material::Metal,
                    low: 555,
                    high: 650,
                },
                RangeCfg {
                    category: Material::Glass,
                    low: 540,
                    high: 554,
                },
                RangeCfg {
                    category: Material::Plastic,
                    low: 527,
                    high: 539,
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RangeToml {
    Tuple((Material, i32, i32)),
    Table {
        category: Material,
        low: i32,
        high: i32,
    },
}

fn de_ranges<'de, D>(deserializer: D) -> Result<Vec<RangeCfg>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<RangeToml> = Vec::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|r| match r {
            RangeToml::Tuple((category, low, high)) | RangeToml::Table { category, low, high } => {
                RangeCfg {
                    category,
                    low,
                    high,
                }
            }
        })
        .collect())
}

/// Target actuator position per material.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct PositionsCfg {
    pub plastic: Option<i32>,
    pub glass: Option<i32>,
    pub metal: Option<i32>,
}

impl Default for PositionsCfg {
    fn default() -> Self {
        Self {
            plastic: Some(80),
            glass: Some(100),
            metal: Some(125),
        }
    }
}

impl PositionsCfg {
    pub fn get(&self, m: Material) -> Option<i32> {
        match m {
            Material::Plastic => self.plastic,
            Material::Glass => self.glass,
            Material::Metal => self.metal,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ActuatorCfg {
    /// Position commanded at startup and assumed thereafter.
    pub initial_position: i32,
    pub positions: PositionsCfg,
    pub min_position: i32,
    pub max_position: i32,
}

impl Default for ActuatorCfg {
    fn default() -> Self {
        Self {
            initial_position: 100,
            positions: PositionsCfg::default(),
            min_position: 0,
            max_position: 180,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Number of peaks to collect before dumping and halting.
    pub capacity: usize,
    /// Optional file to also write the dump to.
    pub output: Option<String>,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            capacity: 100,
            output: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Poll sensor and clock inline in the control loop.
    #[default]
    Direct,
    /// Poll on a dedicated thread and hand samples over a channel. The thread
    /// may read up to `channel_capacity` samples ahead of the engine; it is
    /// stopped as soon as a calibration run fills.
    Sampler,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SamplingCfg {
    pub mode: SamplingMode,
    /// Pause between polls in microseconds; 0 busy-polls.
    pub poll_interval_us: u64,
    /// Bound of the sampler hand-off channel (sampler mode only).
    pub channel_capacity: usize,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            mode: SamplingMode::Direct,
            poll_interval_us: 0,
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Pins {
    /// MCP3008 input channel carrying the sensor signal.
    pub adc_channel: u8,
    pub spi_bus: u8,
    pub spi_ss: u8,
    /// GPIO (BCM) driving the sorter servo.
    pub servo: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            adc_channel: 0,
            spi_bus: 0,
            spi_ss: 0,
            servo: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Hardware {
    pub spi_clock_hz: u32,
    pub servo_min_pulse_us: u64,
    pub servo_max_pulse_us: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            spi_clock_hz: 1_350_000,
            servo_min_pulse_us: 544,
            servo_max_pulse_us: 2400,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorCfg,
    pub capture: CaptureCfg,
    pub classifier: ClassifierCfg,
    pub actuator: ActuatorCfg,
    pub calibration: CalibrationCfg,
    pub sampling: SamplingCfg,
    pub pins: Pins,
    pub hardware: Hardware,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.sensor.range_min >= self.sensor.range_max {
            eyre::bail!("sensor.range_min must be < sensor.range_max");
        }
        if !(self.sensor.vref.is_finite() && self.sensor.vref > 0.0) {
            eyre::bail!("sensor.vref must be > 0");
        }

        // Capture
        if !(self.sensor.range_min..=self.sensor.range_max)
            .contains(&self.capture.trigger_threshold)
        {
            eyre::bail!(
                "capture.trigger_threshold must be within [{}, {}]",
                self.sensor.range_min,
                self.sensor.range_max
            );
        }
        if self.capture.peak_window_ms == 0 {
            eyre::bail!("capture.peak_window_ms must be >= 1");
        }
        if self.capture.peak_window_ms > 60 * 1000 {
            eyre::bail!("capture.peak_window_ms is unreasonably large (>60s)");
        }
        if self.capture.cooldown_ms > 60 * 60 * 1000 {
            eyre::bail!("capture.cooldown_ms is unreasonably large (>1h)");
        }

        // Classifier
        for (i, r) in self.classifier.ranges.iter().enumerate() {
            if r.low > r.high {
                eyre::bail!("classifier.ranges[{i}]: low ({}) must be <= high ({})", r.low, r.high);
            }
        }

        // Actuator
        let (lo, hi) = (self.actuator.min_position, self.actuator.max_position);
        if lo > hi {
            eyre::bail!("actuator.min_position must be <= actuator.max_position");
        }
        if !(lo..=hi).contains(&self.actuator.initial_position) {
            eyre::bail!("actuator.initial_position must be within [{lo}, {hi}]");
        }
        for m in [Material::Plastic, Material::Glass, Material::Metal] {
            if let Some(p) = self.actuator.positions.get(m)
                && !(lo..=hi).contains(&p)
            {
                eyre::bail!("actuator.positions.{} must be within [{lo}, {hi}]", m.as_str());
            }
        }

        // Calibration
        if self.calibration.capacity == 0 {
            eyre::bail!("calibration.capacity must be >= 1");
        }
        if self.calibration.capacity > MAX_CALIBRATION_CAPACITY {
            eyre::bail!("calibration.capacity must be <= {MAX_CALIBRATION_CAPACITY}");
        }

        // Sampling
        if self.sampling.channel_capacity == 0 {
            eyre::bail!("sampling.channel_capacity must be >= 1");
        }
        if self.sampling.poll_interval_us > 1_000_000 {
            eyre::bail!("sampling.poll_interval_us is unreasonably large (>1s)");
        }

        // Pins / hardware
        if self.pins.adc_channel > 7 {
            eyre::bail!("pins.adc_channel must be in 0..=7");
        }
        if self.hardware.spi_clock_hz == 0 {
            eyre::bail!("hardware.spi_clock_hz must be > 0");
        }
        if self.hardware.servo_min_pulse_us >= self.hardware.servo_max_pulse_us {
            eyre::bail!("hardware.servo_min_pulse_us must be < hardware.servo_max_pulse_us");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// One recorded sample of a signal trace.
///
/// Expected headers:
/// timestamp_ms,raw[,volts]
///
/// Example:
/// timestamp_ms,raw,volts
/// 0,500,2.444
/// 10,530,2.590
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct TraceRow {
    pub timestamp_ms: u64,
    pub raw: i32,
}

/// Parse a trace from any reader (see `TraceRow` for the format).
pub fn parse_trace_csv<R: std::io::Read>(reader: R) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read trace CSV headers: {e}"))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    let ok = matches!(
        actual.as_slice(),
        ["timestamp_ms", "raw"] | ["timestamp_ms", "raw", "volts"]
    );
    if !ok {
        eyre::bail!(
            "trace CSV must have headers 'timestamp_ms,raw' (optionally ',volts'), got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<TraceRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid trace row {}: {e}", idx + 2))?;
        if let Some(prev) = rows.last()
            && row.timestamp_ms < prev.timestamp_ms
        {
            eyre::bail!(
                "trace timestamps must be non-decreasing (row {}: {} < {})",
                idx + 2,
                row.timestamp_ms,
                prev.timestamp_ms
            );
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;
    parse_trace_csv(file).map_err(|e| eyre::eyre!("{:?}: {e}", path))
}

/// Extract the peak list from a calibration dump.
///
/// Lines before `DUMP_BEGIN` and after `DUMP_END` are ignored (banners, progress
/// output); every non-blank line in between must be an integer.
pub fn parse_peak_dump(text: &str) -> eyre::Result<Vec<i32>> {
    let mut lines = text.lines().map(str::trim);
    if !lines.by_ref().any(|l| l == DUMP_BEGIN) {
        eyre::bail!("calibration dump has no {DUMP_BEGIN} line");
    }
    let mut peaks = Vec::new();
    for (n, line) in lines.enumerate() {
        if line == DUMP_END {
            return Ok(peaks);
        }
        if line.is_empty() {
            continue;
        }
        let v = line
            .parse::<i32>()
            .map_err(|e| eyre::eyre!("calibration dump line {} after {DUMP_BEGIN}: {line:?}: {e}", n + 1))?;
        peaks.push(v);
    }
    eyre::bail!("calibration dump is truncated (no {DUMP_END} line)")
}

pub fn load_peak_dump(path: &std::path::Path) -> eyre::Result<Vec<i32>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read calibration dump {:?}: {}", path, e))?;
    parse_peak_dump(&text)
}
