//! Index construction and query benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hyperlsh::benchmark::create_clustered_dataset;
use hyperlsh::hash::{LSHIndex, LSHParams};

const DIM: usize = 32;

fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    group.sample_size(10);

    for n in [1_000, 10_000, 50_000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let dataset = create_clustered_dataset(*n, 0, DIM, 32, 0.05, 42);

        for parallel in [false, true] {
            let params = LSHParams::new(0.9, 0.5).with_seed(1).with_parallel(parallel);
            let id = format!("{n}/{}", if parallel { "par" } else { "seq" });
            group.bench_function(BenchmarkId::from_parameter(id), |bench| {
                bench.iter(|| LSHIndex::build(black_box(&dataset.buffer), DIM, params.clone()));
            });
        }
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for n in [1_000, 10_000, 50_000].iter() {
        let dataset = create_clustered_dataset(*n, 100, DIM, 32, 0.05, 42);
        let index = LSHIndex::build(&dataset.buffer, DIM, LSHParams::new(0.9, 0.5).with_seed(1))
            .expect("build");

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            let mut i = 0;
            bench.iter(|| {
                let q = &dataset.queries[i % dataset.queries.len()];
                i += 1;
                index.search_k(black_box(q), 10)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_preprocess, bench_search);
criterion_main!(benches);
