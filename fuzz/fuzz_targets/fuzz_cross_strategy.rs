#![no_main]

use libfuzzer_sys::fuzz_target;

use labseq_core::evaluator::Evaluators;
use labseq_core::observer::NoOpObserver;
use labseq_core::options::EngineOptions;
use labseq_core::pool::build_worker_pool;
use labseq_core::progress::CancellationToken;
use labseq_core::selector::Strategy;
use labseq_core::store::MemoStore;

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }
    // First 4 bytes pick n, the next two shape chunks and blocks.
    let n = u64::from(u32::from_le_bytes([data[0], data[1], data[2], data[3]])) % 5_000;
    let chunk_size = u64::from(data[4]) + 1;
    let block_size = u64::from(data[5]) * 8 + 1;

    let opts = EngineOptions {
        chunk_size,
        block_size,
        workers: 2,
        ..Default::default()
    }
    .normalize();
    let Ok(pool) = build_worker_pool(opts.workers) else {
        return;
    };
    let evaluators = Evaluators::new(&opts, pool);
    let cancel = CancellationToken::new();
    let observer = NoOpObserver::new();

    let expected = labseq_core::labseq(n);
    for strategy in Strategy::ALL {
        let store = MemoStore::new();
        let value = evaluators
            .get(strategy)
            .fill(&store, n, &cancel, &observer)
            .expect("fill without cancellation must succeed");
        assert_eq!(*value, expected, "{strategy} disagrees at n={n}");
    }
});
