use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use sorter_core::{CaptureCfg, Classifier, PeakCaptureEngine, Sample};

// Baseline noise with a burst every 4000 ms, sampled at 10 kHz-ish (1 sample per 0.1 ms
// collapsed to integer ms, so several samples share a timestamp).
fn synth_trace(n: usize, seed: u32) -> Vec<Sample> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    (0..n)
        .map(|i| {
            let t = (i / 10) as u64;
            let noise = (next() % 20) as i32;
            let burst = if t % 4000 < 30 { 60 } else { 0 };
            Sample::new(t, 500 + noise + burst)
        })
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    let trace = synth_trace(200_000, 7);
    c.bench_function("engine_process_200k", |b| {
        b.iter_batched(
            || PeakCaptureEngine::new(CaptureCfg::default()),
            |mut e| {
                let mut n = 0u32;
                for s in &trace {
                    if e.process(black_box(*s)).is_some() {
                        n += 1;
                    }
                }
                n
            },
            BatchSize::SmallInput,
        );
    });

    let classifier = Classifier::default();
    c.bench_function("classify_0_1023", |b| {
        b.iter(|| (0..1024).map(|m| classifier.classify(black_box(m))).count());
    });
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
