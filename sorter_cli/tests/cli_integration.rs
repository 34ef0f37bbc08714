use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

/// One excitation per peak, spaced past the default 3000 ms cooldown.
fn write_trace(dir: &Path, peaks: &[i32]) -> PathBuf {
    let mut csv = String::from("timestamp_ms,raw\n");
    for (i, p) in peaks.iter().enumerate() {
        let base = i as u64 * 5000;
        csv.push_str(&format!("{base},{p}\n"));
        csv.push_str(&format!("{},{}\n", base + 20, p - 3));
        csv.push_str(&format!("{},0\n", base + 50));
        csv.push_str(&format!("{},0\n", base + 4000));
    }
    let path = dir.join("trace.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn sorter(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sorter").unwrap();
    // Point at a file that does not exist so built-in defaults apply.
    cmd.arg("--config").arg(dir.join("absent.toml"));
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["analyze"], 2, "--dump", "stderr")]
#[case(&["self-check"], 0, "OK (simulation backend", "stdout")]
#[case(&["calibrate", "--capacity", "0"], 4, "capacity must be >= 1", "stderr")]
#[case(&["calibrate", "--capacity", "18446744073709551615"], 4, "capacity must be <= 1000000", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let mut cmd = sorter(dir.path());
    cmd.args(args);
    let assert = cmd.assert().code(exit_code);
    if stream == "stdout" {
        assert.stdout(predicate::str::contains(needle));
    } else {
        assert.stderr(predicate::str::contains(needle));
    }
}

#[test]
fn sort_replays_trace_and_reports_each_peak() {
    let dir = tempdir().unwrap();
    let trace = write_trace(dir.path(), &[545, 530, 700, 600]);
    sorter(dir.path())
        .args(["sort", "--trace"])
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "--- Detector + Sorter (with enforced cooldown) ---\n\
             Peak: 545 -> GLASS (->100°)\n\
             Peak: 530 -> PLASTIC (->80°)\n\
             Peak: 700 -> UNKNOWN (no move)\n\
             Peak: 600 -> METAL (->125°)\n",
        ));
}

#[test]
fn sort_stops_after_max_events() {
    let dir = tempdir().unwrap();
    let trace = write_trace(dir.path(), &[545, 530, 600]);
    sorter(dir.path())
        .args(["sort", "--max-events", "1", "--trace"])
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("Peak: 545").and(predicate::str::contains("Peak: 530").not()));
}

#[test]
fn calibrate_dumps_and_writes_output_file() {
    let dir = tempdir().unwrap();
    let trace = write_trace(dir.path(), &[545, 530, 600]);
    let out = dir.path().join("peaks.txt");
    sorter(dir.path())
        .args(["calibrate", "--capacity", "2", "--trace"])
        .arg(&trace)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Target Samples: 2"))
        .stdout(predicate::str::contains(
            "545\n530\n\n--- ALL SAMPLES COLLECTED ---\nSTART_DATA_CAPTURE\n545\n530\nEND_DATA_CAPTURE\n",
        ));
    assert_eq!(sorter_config::load_peak_dump(&out).unwrap(), vec![545, 530]);
}

#[test]
fn calibrate_short_trace_writes_no_dump() {
    let dir = tempdir().unwrap();
    let trace = write_trace(dir.path(), &[545]);
    let out = dir.path().join("peaks.txt");
    sorter(dir.path())
        .args(["calibrate", "--capacity", "5", "--trace"])
        .arg(&trace)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("START_DATA_CAPTURE").not())
        .stderr(predicate::str::contains("stopped early"));
    assert!(!out.exists());
}

#[test]
fn invalid_config_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[capture]\npeak_window_ms = 0\n").unwrap();
    Command::cargo_bin("sorter")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("What happened: Configuration error"))
        .stderr(predicate::str::contains("capture.peak_window_ms"));
}

#[test]
fn malformed_toml_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[capture\n").unwrap();
    Command::cargo_bin("sorter")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(4);
}

#[test]
fn bad_trace_header_is_explained() {
    let dir = tempdir().unwrap();
    let trace = dir.path().join("trace.csv");
    fs::write(&trace, "time,value\n0,600\n").unwrap();
    sorter(dir.path())
        .args(["sort", "--trace"])
        .arg(&trace)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid headers in trace CSV"));
}

#[test]
fn analyze_summarises_dump() {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("peaks.txt");
    fs::write(
        &dump,
        "--- ALL SAMPLES COLLECTED ---\nSTART_DATA_CAPTURE\n530\n545\n600\n700\nEND_DATA_CAPTURE\n",
    )
    .unwrap();
    sorter(dir.path())
        .args(["analyze", "--dump"])
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("count: 4"))
        .stdout(predicate::str::contains("min: 530"))
        .stdout(predicate::str::contains("max: 700"))
        .stdout(predicate::str::contains("mean: 593.8"))
        .stdout(predicate::str::contains("UNKNOWN: 1"))
        .stdout(predicate::str::contains("METAL: 1"));
}

#[test]
fn monitor_output_replays_as_trace() {
    let dir = tempdir().unwrap();
    let output = sorter(dir.path())
        .args(["monitor", "--count", "3", "--interval-ms", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "timestamp_ms,raw,volts");

    let trace = dir.path().join("monitor.csv");
    fs::write(&trace, &text).unwrap();
    sorter(dir.path())
        .args(["sort", "--trace"])
        .arg(&trace)
        .assert()
        .success();
}

#[rstest]
#[case(&[], true)]
#[case(&["--log-level", "warn"], false)]
fn configured_log_level_applies_unless_overridden(#[case] flags: &[&str], #[case] debug: bool) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("sorter.toml");
    fs::write(&cfg, "[logging]\nlevel = \"debug\"\n").unwrap();
    let assert = Command::cargo_bin("sorter")
        .unwrap()
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(&cfg)
        .args(flags)
        .arg("self-check")
        .assert()
        .success();
    let logged = predicate::str::contains("config loaded");
    if debug {
        assert.stderr(logged);
    } else {
        assert.stderr(logged.not());
    }
}
