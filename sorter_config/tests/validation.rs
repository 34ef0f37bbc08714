use rstest::rstest;
use sorter_config::{Material, SamplingMode, load_toml};

const FULL: &str = r#"
[sensor]
range_min = 0
range_max = 1023
vref = 5.0

[capture]
trigger_threshold = 527
peak_window_ms = 50
cooldown_ms = 3000

[classifier]
ranges = [
    { category = "metal", low = 555, high = 650 },
    ["glass", 540, 554],
    { category = "plastic", low = 527, high = 539 },
]

[actuator]
initial_position = 100
min_position = 0
max_position = 180

[actuator.positions]
plastic = 80
glass = 100
metal = 125

[calibration]
capacity = 25

[sampling]
mode = "sampler"
poll_interval_us = 200
channel_capacity = 8

[pins]
adc_channel = 2
servo = 18

[logging]
level = "debug"
rotation = "daily"
"#;

#[test]
fn parses_full_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.classifier.ranges.len(), 3);
    assert_eq!(cfg.classifier.ranges[1].category, Material::Glass);
    assert_eq!(cfg.classifier.ranges[1].low, 540);
    assert_eq!(cfg.calibration.capacity, 25);
    assert_eq!(cfg.sampling.mode, SamplingMode::Sampler);
    assert_eq!(cfg.pins.servo, 18);
    // untouched sections keep defaults
    assert_eq!(cfg.hardware.servo_min_pulse_us, 544);
}

#[rstest]
#[case("[capture]\npeak_window_ms = 0\n", "peak_window_ms must be >= 1")]
#[case("[capture]\ntrigger_threshold = 2000\n", "trigger_threshold must be within")]
#[case("[sensor]\nrange_min = 10\nrange_max = 10\n", "range_min must be <")]
#[case("[calibration]\ncapacity = 0\n", "capacity must be >= 1")]
#[case("[calibration]\ncapacity = 9223372036854775807\n", "capacity must be <= 1000000")]
#[case(
    "[classifier]\nranges = [{ category = \"metal\", low = 650, high = 555 }]\n",
    "low (650) must be <= high (555)"
)]
#[case("[actuator]\ninitial_position = 200\n", "initial_position must be within")]
#[case("[actuator.positions]\nmetal = -5\n", "positions.metal must be within")]
#[case("[sampling]\nchannel_capacity = 0\n", "channel_capacity must be >= 1")]
#[case("[pins]\nadc_channel = 8\n", "adc_channel must be in 0..=7")]
#[case(
    "[hardware]\nservo_min_pulse_us = 2400\nservo_max_pulse_us = 544\n",
    "servo_min_pulse_us must be <"
)]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "message {msg:?} lacks {needle:?}");
}

#[test]
fn zero_cooldown_is_allowed() {
    let cfg = load_toml("[capture]\ncooldown_ms = 0\n").expect("parse TOML");
    cfg.validate().expect("zero cooldown is valid");
}

#[test]
fn rejects_unknown_sampling_mode() {
    assert!(load_toml("[sampling]\nmode = \"interrupt\"\n").is_err());
}
