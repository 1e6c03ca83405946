use proptest::prelude::*;
use trap_engine::partition::{assign, ranges, WorkerCount};
use trap_engine::reducer::WorkerContext;
use trap_engine::{estimate_integral, IntegrationParams, LockedEstimate, SharedEstimate, Square};

proptest! {
    #[test]
    fn ranges_tile_all_indices(n in 1u64..5_000, w in 1i64..64) {
        let workers = WorkerCount::new(w).unwrap();
        let mut next = 0u64;
        let mut covered = 0u64;
        for (_, range) in ranges(n, workers) {
            prop_assert_eq!(range.start, next);
            prop_assert!(range.end >= range.start);
            covered += range.len();
            next = range.end;
        }
        prop_assert_eq!(next, n);
        prop_assert_eq!(covered, n);
    }

    #[test]
    fn range_sizes_differ_by_at_most_one(n in 1u64..5_000, w in 1i64..64) {
        let workers = WorkerCount::new(w).unwrap();
        let lens: Vec<u64> = workers.indices().map(|idx| assign(idx, n, workers).len()).collect();
        let min = *lens.iter().min().unwrap();
        let max = *lens.iter().max().unwrap();
        prop_assert!(max - min <= 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn worker_count_only_perturbs_rounding(
        a in -10.0f64..10.0,
        width in 0.1f64..10.0,
        n in 1i64..2_000,
        w in 1i64..16
    ) {
        let b = a + width;
        let single = estimate_integral(a, b, n, 1).unwrap();
        let split = estimate_integral(a, b, n, w).unwrap();
        let scale = single.abs().max(1.0);
        prop_assert!((single - split).abs() <= 1e-9 * scale, "{} vs {}", single, split);
    }
}

#[test]
fn sequential_workers_reproduce_parallel_estimate() {
    let params = IntegrationParams::new(0.0, 2.0, 999).unwrap();
    let workers = WorkerCount::new(7).unwrap();
    let estimate = LockedEstimate::default();
    let ctx = WorkerContext::new(&params, workers, &Square, &estimate);
    for idx in workers.indices() {
        ctx.run(idx);
    }
    let parallel = estimate_integral(0.0, 2.0, 999, 7).unwrap();
    assert!((estimate.value() - parallel).abs() < 1e-12);
}
