//! Property-based tests for the Labseq evaluators and engine.
//!
//! Each evaluator runs against its own fresh store unless a test is about
//! store sharing.

use std::sync::Arc;

use num_bigint::BigUint;
use proptest::prelude::*;

use labseq_core::compaction::CompactionPolicy;
use labseq_core::engine::Engine;
use labseq_core::evaluator::Evaluators;
use labseq_core::iterator::LabseqIterator;
use labseq_core::observer::NoOpObserver;
use labseq_core::options::EngineOptions;
use labseq_core::pool::build_worker_pool;
use labseq_core::progress::CancellationToken;
use labseq_core::selector::{Strategy, Thresholds};
use labseq_core::store::{MemoStore, ValueStore};

fn evaluators(block_size: u64, compaction: Option<CompactionPolicy>) -> Evaluators {
    let opts = EngineOptions {
        chunk_size: 32,
        block_size,
        compaction,
        ..Default::default()
    };
    Evaluators::new(&opts, build_worker_pool(4).unwrap())
}

fn fill(evaluators: &Evaluators, strategy: Strategy, store: &dyn ValueStore, n: u64) -> BigUint {
    let value = evaluators
        .get(strategy)
        .fill(store, n, &CancellationToken::new(), &NoOpObserver::new())
        .unwrap();
    (*value).clone()
}

fn engine(iterative: i64, batched: i64) -> Engine {
    Engine::new(EngineOptions {
        thresholds: Thresholds::new(iterative, batched).unwrap(),
        block_size: 128,
        workers: 2,
        ..Default::default()
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Every strategy agrees with the sequential reference on a fresh store.
    #[test]
    fn all_strategies_agree(n in 0u64..3_000, block_size in 1u64..400) {
        let evals = evaluators(block_size, None);
        let expected = fill(&evals, Strategy::Sequential, &MemoStore::new(), n);
        for strategy in Strategy::ALL {
            let got = fill(&evals, strategy, &MemoStore::new(), n);
            prop_assert_eq!(&got, &expected, "{} disagrees at n={}", strategy, n);
        }
    }

    /// value(n) == value(n-4) + value(n-3), each side from its own engine.
    #[test]
    fn recurrence_law(n in 4i64..4_000) {
        let lhs = engine(50, 500).calculate(n).unwrap();
        let rhs = engine(50, 500).calculate(n - 4).unwrap()
            + engine(50, 500).calculate(n - 3).unwrap();
        prop_assert_eq!(lhs, rhs, "recurrence fails at n={}", n);
    }

    /// A second call returns the same value without writing to the store.
    #[test]
    fn calculate_is_idempotent(n in 0i64..5_000) {
        let engine = engine(100, 1_000);
        let first = engine.calculate(n).unwrap();
        let writes = engine.store().stats().writes;
        let second = engine.calculate(n).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(engine.store().stats().writes, writes);
    }

    /// Interleaved strategies over one shared, compacting store stay correct.
    #[test]
    fn shared_store_with_compaction(
        ns in proptest::collection::vec(0u64..2_500, 1..6),
        window in 4u64..64,
    ) {
        let policy = CompactionPolicy::new(window).with_interval(16);
        let evals = evaluators(101, Some(policy));
        let store = MemoStore::new();
        for (k, &n) in ns.iter().enumerate() {
            let strategy = Strategy::ALL[k % Strategy::ALL.len()];
            let got = fill(&evals, strategy, &store, n);
            let expected = LabseqIterator::from_index(n).next().unwrap().1;
            prop_assert_eq!(got, expected, "{} at n={}", strategy, n);
        }
        for i in 0..4u64 {
            prop_assert!(store.contains(i));
        }
    }

    /// Negative indices are rejected and never reach the store.
    #[test]
    fn negative_input_rejected(n in i64::MIN..0) {
        let engine = engine(10, 100);
        prop_assert!(engine.calculate(n).is_err());
        prop_assert_eq!(engine.store().len(), 4);
    }
}

#[test]
fn representative_indices_per_range() {
    // SMALL, MEDIUM and LARGE under the thresholds used here.
    let evals = evaluators(1_000, None);
    for n in [10u64, 5_000, 15_000] {
        let expected = fill(&evals, Strategy::Sequential, &MemoStore::new(), n);
        for strategy in [Strategy::Chunked, Strategy::Segmented, Strategy::NaiveParallel] {
            assert_eq!(
                fill(&evals, strategy, &MemoStore::new(), n),
                expected,
                "{strategy} at n={n}"
            );
        }
    }
}

#[test]
fn shared_store_concurrent_engines() {
    let store: Arc<dyn ValueStore> = Arc::new(MemoStore::new());
    let pool = build_worker_pool(4).unwrap();
    let handles: Vec<_> = [(0usize, 4_000i64), (1, 2_500), (2, 4_100), (3, 900)]
        .into_iter()
        .map(|(k, n)| {
            let opts = EngineOptions {
                thresholds: Thresholds::new(500, 3_000).unwrap(),
                block_size: 333,
                compaction: (k % 2 == 0).then(|| CompactionPolicy::new(8).with_interval(8)),
                ..Default::default()
            };
            let engine = Engine::from_parts(opts, Arc::clone(&store), Arc::clone(&pool)).unwrap();
            std::thread::spawn(move || (n, engine.calculate(n).unwrap()))
        })
        .collect();
    for handle in handles {
        let (n, value) = handle.join().unwrap();
        let expected = labseq_core::labseq(u64::try_from(n).unwrap());
        assert_eq!(value, expected, "n = {n}");
    }
}
