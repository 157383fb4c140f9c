use bulletin_engine::run_pipeline;
use bulletin_perf::pipeline_config;
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);

    for (producers, queue_size) in [(1u32, 1usize), (3, 8), (5, 64)] {
        let config = pipeline_config(producers, 1_000, queue_size);
        group.throughput(Throughput::Elements(config.total_messages()));

        group.bench_function(format!("{producers} producers x 1k (cap={queue_size})"), |b| {
            b.iter(|| {
                let mut lines: Vec<String> = Vec::with_capacity(producers as usize * 1_000 + 1);
                let report = run_pipeline(black_box(&config), &mut lines)
                    .expect("pipeline run failed");
                black_box(report);
            });
        });
    }

    drop(group);
}

criterion_group!(benches, bench_full_pipeline);
criterion_main!(benches);
