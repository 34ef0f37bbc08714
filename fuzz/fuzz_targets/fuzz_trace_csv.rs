#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(rows) = sorter_config::parse_trace_csv(data) {
        assert!(rows.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
    }
});
