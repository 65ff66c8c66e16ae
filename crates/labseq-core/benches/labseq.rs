//! Criterion benchmarks for the Labseq evaluators.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use num_bigint::BigUint;

use labseq_core::evaluator::Evaluators;
use labseq_core::observer::NoOpObserver;
use labseq_core::options::EngineOptions;
use labseq_core::pool::build_worker_pool;
use labseq_core::progress::CancellationToken;
use labseq_core::selector::Strategy;
use labseq_core::store::MemoStore;
use labseq_core::transition::Transition;

fn compute(evaluators: &Evaluators, strategy: Strategy, n: u64) -> BigUint {
    let store = MemoStore::new();
    let cancel = CancellationToken::new();
    let observer = NoOpObserver::new();
    let value = evaluators
        .get(strategy)
        .fill(&store, n, &cancel, &observer)
        .unwrap();
    (*value).clone()
}

fn bench_strategies(c: &mut Criterion) {
    let opts = EngineOptions {
        block_size: 10_000,
        ..Default::default()
    }
    .normalize();
    let evaluators = Evaluators::new(&opts, build_worker_pool(0).unwrap());
    let ns: Vec<u64> = vec![1_000, 10_000, 50_000];

    for strategy in Strategy::ALL {
        let mut group = c.benchmark_group(strategy.name());
        group.sample_size(10);
        for &n in &ns {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter(|| compute(&evaluators, strategy, n));
            });
        }
        group.finish();
    }
}

fn bench_transition(c: &mut Criterion) {
    let mut group = c.benchmark_group("TransitionPower");
    for steps in [1_000u64, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(steps), &steps, |b, &steps| {
            b.iter(|| Transition::power(steps));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_strategies, bench_transition);
criterion_main!(benches);
