use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sorter_core::mocks::{FailingSensor, RecordingActuator, ScriptedSensor};
use sorter_core::{
    ActuationCfg, CalibrationOutcome, CaptureCfg, Category, ClassifierCfg, Poller, RecorderCfg,
    RunOptions, Sample, SampleSource, Sampler, SorterError, TraceSource, build_calibrator,
    build_sorter, run_calibration, run_sorting,
};
use sorter_traits::ManualClock;

const FAST: CaptureCfg = CaptureCfg {
    trigger_threshold: 527,
    peak_window_ms: 50,
    cooldown_ms: 100,
};

/// One excitation polled every 10 ms: window closes at index 5, re-armed at 15.
fn cycle(peak: i32) -> Vec<i32> {
    let mut v = vec![peak, peak - 5, peak - 10, 400, 300];
    v.resize(20, 0);
    v
}

/// Trace with one peak per entry, spaced far enough apart to clear cooldown.
fn trace(peaks: &[i32]) -> TraceSource {
    let mut samples = Vec::new();
    for (i, &p) in peaks.iter().enumerate() {
        let base = i as u64 * 1000;
        samples.push(Sample::new(base, p));
        samples.push(Sample::new(base + 20, p - 3));
        samples.push(Sample::new(base + 50, 0));
        samples.push(Sample::new(base + 500, 0));
    }
    TraceSource::new(samples)
}

#[test]
fn threaded_calibration_stops_the_sampler_once_full() {
    let mut script = cycle(600);
    script.extend(cycle(545));
    let sensor = ScriptedSensor::new(script);
    let reads = sensor.read_counter();
    let mut source = Sampler::spawn(sensor, ManualClock::new(), Duration::from_millis(10), 4);
    let mut cal = build_calibrator(FAST, RecorderCfg { capacity: 2 }).unwrap();
    let stop = AtomicBool::new(false);

    let outcome = run_calibration(&mut source, &mut cal, &stop, &mut std::io::sink()).unwrap();

    assert_eq!(outcome, CalibrationOutcome::Complete);
    assert_eq!(cal.recorder().values(), &[600, 545]);
    // 26 samples consumed; read-ahead is bounded by the channel plus one in flight.
    let after_close = reads.load(Ordering::Relaxed);
    assert!(after_close <= 26 + 4 + 2, "read {after_close} samples");
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(reads.load(Ordering::Relaxed), after_close);
    assert!(source.next_sample().unwrap().is_none());
}

#[test]
fn calibration_halts_once_full_without_polling_again() {
    let mut script = cycle(600);
    script.extend(cycle(545));
    script.extend(cycle(530));
    script.extend(cycle(560));
    let sensor = ScriptedSensor::new(script);
    let reads = sensor.read_counter();
    let mut source =
        Poller::new(sensor, ManualClock::new()).with_interval(Duration::from_millis(10));
    let mut cal = build_calibrator(FAST, RecorderCfg { capacity: 3 }).unwrap();
    let stop = AtomicBool::new(false);
    let mut out = Vec::new();

    let outcome = run_calibration(&mut source, &mut cal, &stop, &mut out).unwrap();

    assert_eq!(outcome, CalibrationOutcome::Complete);
    assert_eq!(cal.recorder().values(), &[600, 545, 530]);
    // Third window closes on sample 45; nothing is read after that.
    assert_eq!(reads.load(Ordering::Relaxed), 46);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "600\n545\n530\n\n--- ALL SAMPLES COLLECTED ---\nSTART_DATA_CAPTURE\n600\n545\n530\nEND_DATA_CAPTURE\n"
    );
}

#[test]
fn calibration_source_end_writes_no_dump() {
    let mut cal = build_calibrator(FAST, RecorderCfg { capacity: 5 }).unwrap();
    let mut out = Vec::new();
    let outcome = run_calibration(
        &mut trace(&[600, 545]),
        &mut cal,
        &AtomicBool::new(false),
        &mut out,
    )
    .unwrap();
    assert_eq!(outcome, CalibrationOutcome::SourceEnded);
    assert_eq!(cal.recorder().values(), &[600, 545]);
    assert_eq!(String::from_utf8(out).unwrap(), "600\n545\n");
}

#[test]
fn calibration_stops_on_shutdown() {
    let mut cal = build_calibrator(FAST, RecorderCfg { capacity: 5 }).unwrap();
    let mut out = Vec::new();
    let outcome =
        run_calibration(&mut trace(&[600]), &mut cal, &AtomicBool::new(true), &mut out).unwrap();
    assert_eq!(outcome, CalibrationOutcome::Interrupted);
    assert!(out.is_empty());
}

#[test]
fn sorting_routes_each_peak_and_skips_redundant_moves() {
    let act = RecordingActuator::new();
    let mut sorter = build_sorter(
        act.clone(),
        FAST,
        ClassifierCfg::default(),
        ActuationCfg::default(),
    )
    .unwrap();
    let mut lines = Vec::new();

    let summary = run_sorting(
        &mut trace(&[545, 548, 530, 700, 600]),
        &mut sorter,
        &AtomicBool::new(false),
        RunOptions::default(),
        |ev| {
            lines.push(ev.to_string());
            Ok(())
        },
    )
    .unwrap();

    assert_eq!(
        lines,
        vec![
            "Peak: 545 -> GLASS (->100°)",
            "Peak: 548 -> GLASS (->100°)",
            "Peak: 530 -> PLASTIC (->80°)",
            "Peak: 700 -> UNKNOWN (no move)",
            "Peak: 600 -> METAL (->125°)",
        ]
    );
    assert_eq!(act.moves(), vec![80, 125]);
    assert_eq!(summary.events, 5);
    assert_eq!(summary.commands, 2);
    assert_eq!(summary.samples, 20);
    assert_eq!(summary.count(Category::Glass), 2);
    assert_eq!(summary.count(Category::Unknown), 1);
}

#[test]
fn sorting_respects_max_events() {
    let mut sorter = build_sorter(
        RecordingActuator::new(),
        FAST,
        ClassifierCfg::default(),
        ActuationCfg::default(),
    )
    .unwrap();
    let summary = run_sorting(
        &mut trace(&[545, 530, 600]),
        &mut sorter,
        &AtomicBool::new(false),
        RunOptions {
            max_events: Some(2),
        },
        |_| Ok(()),
    )
    .unwrap();
    assert_eq!(summary.events, 2);
}

#[test]
fn sensor_fault_aborts_sorting() {
    let mut sorter = build_sorter(
        RecordingActuator::new(),
        FAST,
        ClassifierCfg::default(),
        ActuationCfg::default(),
    )
    .unwrap();
    let err = run_sorting(
        &mut Poller::new(FailingSensor, ManualClock::new()),
        &mut sorter,
        &AtomicBool::new(false),
        RunOptions::default(),
        |_| Ok(()),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SorterError>(),
        Some(SorterError::Io(_))
    ));
}
