//! Sampler thread lifecycle: ordering, fault forwarding, clean shutdown.

use std::time::Duration;

use sorter_core::mocks::{FailingSensor, ScriptedSensor};
use sorter_core::{SampleSource, Sampler, SorterError};
use sorter_traits::{ManualClock, MonotonicClock};

#[test]
fn samples_arrive_in_order_without_drops() {
    let values: Vec<i32> = (0..50).collect();
    let mut sampler = Sampler::spawn(
        ScriptedSensor::new(values.clone()),
        ManualClock::new(),
        Duration::from_millis(1),
        2,
    );
    for (i, want) in values.iter().enumerate() {
        let s = sampler.next_sample().unwrap().unwrap();
        assert_eq!(s.magnitude, *want);
        assert_eq!(s.timestamp_ms, i as u64);
    }
}

#[test]
fn sensor_fault_is_forwarded_then_source_ends() {
    let mut sampler = Sampler::spawn(FailingSensor, MonotonicClock::new(), Duration::ZERO, 4);
    let err = sampler.next_sample().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SorterError>(),
        Some(SorterError::Io(_))
    ));
    assert!(sampler.next_sample().unwrap().is_none());
}

#[test]
fn drop_with_full_channel_does_not_hang() {
    let sampler = Sampler::spawn(
        ScriptedSensor::new(vec![1]),
        MonotonicClock::new(),
        Duration::ZERO,
        1,
    );
    std::thread::sleep(Duration::from_millis(20));
    assert!(sampler.produced() >= 1);
    drop(sampler);
}

#[test]
fn multiple_samplers_dont_leak_threads() {
    for _ in 0..10 {
        let mut sampler = Sampler::spawn(
            ScriptedSensor::new(vec![5]),
            MonotonicClock::new(),
            Duration::from_millis(1),
            8,
        );
        let _ = sampler.next_sample();
        sampler.stop();
        drop(sampler);
    }
}
