use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use sct_core::calibration::calibrate;
use sct_core::mocks::ScriptedBoard;
use sct_core::util::{DEFAULT_CPU_HZ, target_reference};

pub fn bench_calibrate(c: &mut Criterion) {
    let mut g = c.benchmark_group("calibration");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 cargo bench -p sct_core --bench calibration
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(10));
        }
    }
    let target = target_reference(DEFAULT_CPU_HZ);

    for factory in [0u8, 100, 120, 200] {
        g.bench_function(format!("factory_{factory}"), |b| {
            b.iter_batched(
                || ScriptedBoard::new(factory),
                |mut board| black_box(calibrate(&mut board, black_box(target))),
                BatchSize::SmallInput,
            );
        });
    }
    g.finish();
}

criterion_group!(benches, bench_calibrate);
criterion_main!(benches);
