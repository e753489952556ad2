use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use plyframes::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_frame(n_rows: usize, n_categories: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(42);

    let ids: Vec<i64> = (0..n_rows).map(|i| i as i64).collect();
    let categories: Vec<String> = (0..n_rows)
        .map(|_| format!("cat_{}", rng.random_range(0..n_categories)))
        .collect();
    let value1s: Vec<f64> = (0..n_rows).map(|_| rng.random::<f64>()).collect();
    let value2s: Vec<f64> = (0..n_rows).map(|_| rng.random::<f64>()).collect();

    DataFrame::new(vec![
        ("id".to_string(), Series::Int64(ids)),
        ("category".to_string(), Series::Utf8(categories)),
        ("value1".to_string(), Series::Float64(value1s)),
        ("value2".to_string(), Series::Float64(value2s)),
    ])
    .expect("benchmark frame")
}

fn bench_ungrouped_verbs(c: &mut Criterion) {
    let mut group = c.benchmark_group("ungrouped_verbs");

    let n_rows = 100_000usize;
    let data = Dataset::from(make_frame(n_rows, 10));
    let dispatcher = Dispatcher::new(Options::default());

    group.throughput(Throughput::Elements(n_rows as u64));

    let verbs = [
        ("mutate", mutate([("ratio", "value1 / (value2 + 1)")])),
        ("query", query("value1 > 0.5 & id % 2 == 0")),
        ("arrange", arrange(["category", "-value1"])),
        ("distinct", distinct(Distinct::new().columns(["category"]))),
        ("summarize", summarize([("total", "sum(value1)"), ("avg", "mean(value2)")])),
    ];
    for (name, verb) in &verbs {
        group.bench_function(*name, |bench| {
            bench.iter(|| {
                let mut input = data.clone();
                black_box(dispatcher.apply(&mut input, verb).expect("verb"))
            });
        });
    }

    group.finish();
}

fn bench_grouped_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_summarize");

    let n_rows = 100_000usize;
    let verb = summarize([("total", "sum(value1)"), ("sd", "std(value2)"), ("n", "{n}")]);

    for n_categories in [10usize, 1_000] {
        let frame = make_frame(n_rows, n_categories);
        let data = Dataset::from(frame)
            .group_by(&["category"])
            .expect("grouped frame");

        for parallel in [false, true] {
            let dispatcher = Dispatcher::new(Options::new().parallel(parallel));
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(
                BenchmarkId::new(label, n_categories),
                &data,
                |bench, data| {
                    bench.iter(|| {
                        let mut input = data.clone();
                        black_box(dispatcher.apply(&mut input, &verb).expect("summarize"))
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_ungrouped_verbs, bench_grouped_summarize);
criterion_main!(benches);
