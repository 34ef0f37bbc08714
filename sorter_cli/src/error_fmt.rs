//! Human-readable error descriptions, exit codes and structured JSON errors.

use sorter_core::error::{BuildError, SorterError};

/// Exit code for errors without a more specific class.
pub const EXIT_GENERIC: i32 = 1;
/// Sensor or actuator failure.
pub const EXIT_HARDWARE: i32 = 3;
/// Invalid or unreadable configuration.
pub const EXIT_CONFIG: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuator => {
                "What happened: No actuator was provided to the sorter.\nLikely causes: The servo failed to initialize or was not wired into the builder.\nHow to fix: Ensure the actuator is created successfully and passed via with_actuator(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See etc/sorter_config.toml for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SorterError>() {
        return match se {
            SorterError::Config(msg) => format!(
                "What happened: Configuration error: {msg}.\nLikely causes: A typo, a wrong type, or a value outside its allowed range.\nHow to fix: Edit the config file (see etc/sorter_config.toml) and rerun `sorter self-check`."
            ),
            SorterError::Hardware(msg) | SorterError::HardwareFault(msg) => format!(
                "What happened: Hardware error: {msg}.\nLikely causes: ADC or servo not wired correctly, no power, or missing SPI/GPIO permissions.\nHow to fix: Check the [pins] section and wiring, then rerun `sorter self-check`."
            ),
            SorterError::Io(msg) => format!(
                "What happened: I/O error: {msg}.\nLikely causes: A device or file became unavailable.\nHow to fix: Re-run with --log-level=debug for details."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("trace csv must have headers") {
        return "Invalid headers in trace CSV. Expected 'timestamp_ms,raw' (optionally ',volts').".to_string();
    }
    if lower.contains("start_data_capture") || lower.contains("end_data_capture") {
        return format!(
            "What happened: The calibration dump could not be read ({msg}).\nLikely causes: The capture was cut short or the file holds something else.\nHow to fix: Re-run `sorter calibrate --output FILE` and pass that file."
        );
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 hardware, 4 config, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match reason_for_error(err) {
        "Hardware" => EXIT_HARDWARE,
        "Config" => EXIT_CONFIG,
        _ => EXIT_GENERIC,
    }
}

fn reason_for_error(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => "Config",
            BuildError::MissingActuator => "Hardware",
        };
    }
    match err.downcast_ref::<SorterError>() {
        Some(SorterError::Config(_)) => "Config",
        Some(SorterError::Hardware(_) | SorterError::HardwareFault(_)) => "Hardware",
        Some(SorterError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_for_error(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_exit_4() {
        let e = eyre::Report::new(SorterError::Config("capture.peak_window_ms must be >= 1".into()));
        assert_eq!(exit_code_for_error(&e), EXIT_CONFIG);
        assert!(humanize(&e).starts_with("What happened: Configuration error"));
    }

    #[test]
    fn hardware_errors_exit_3() {
        let e = eyre::Report::new(SorterError::HardwareFault("spi: bus busy".into()));
        assert_eq!(exit_code_for_error(&e), EXIT_HARDWARE);
    }

    #[test]
    fn other_errors_exit_1() {
        let e = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&e), EXIT_GENERIC);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Error");
        assert_eq!(v["exit_code"], 1);
    }
}
