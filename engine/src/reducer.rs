use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{
    accumulator::{AtomicEstimate, LocalSum, LockedEstimate, SharedEstimate},
    config::{Accumulator, EngineConfig},
    errors::{EngineError, Result},
    integrand::{Integrand, Square},
    params::IntegrationParams,
    partition::{self, IndexRange, WorkerCount, WorkerIndex},
};

/// Scaled partial sum one worker added to the shared estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkerContribution {
    pub worker: WorkerIndex,
    pub range: IndexRange,
    pub contribution: f64,
}

/// Outcome of a finalized reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateReport {
    pub lower: f64,
    pub upper: f64,
    pub subdivisions: u64,
    pub workers: usize,
    pub estimate: f64,
    /// Wall-clock time from pool construction to the last worker returning.
    pub elapsed: Duration,
    pub contributions: Vec<WorkerContribution>,
}

impl EstimateReport {
    pub fn summary(&self) -> String {
        format!(
            "n={}, workers={}, empty_ranges={}, estimate={:e}",
            self.subdivisions,
            self.workers,
            self.empty_ranges(),
            self.estimate
        )
    }

    pub fn empty_ranges(&self) -> usize {
        self.contributions
            .iter()
            .filter(|c| c.range.is_empty())
            .count()
    }
}

/// Lifecycle of a single reduction. The estimate may only be read once
/// `Finalized` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReducerPhase {
    NotStarted,
    WorkersSpawned,
    AllJoined,
    Finalized,
}

impl ReducerPhase {
    fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::WorkersSpawned),
            Self::WorkersSpawned => Some(Self::AllJoined),
            Self::AllJoined => Some(Self::Finalized),
            Self::Finalized => None,
        }
    }
}

struct Reduction<S> {
    phase: ReducerPhase,
    estimate: S,
}

impl<S: SharedEstimate> Reduction<S> {
    fn new() -> Self {
        Self {
            phase: ReducerPhase::NotStarted,
            estimate: S::default(),
        }
    }

    fn advance(&mut self, to: ReducerPhase) -> Result<()> {
        if self.phase.next() != Some(to) {
            return Err(EngineError::other(format!(
                "illegal reducer transition {:?} -> {:?}",
                self.phase, to
            )));
        }
        tracing::trace!(target: "engine", from = ?self.phase, ?to, "reducer phase");
        self.phase = to;
        Ok(())
    }

    fn finalize(&mut self) -> Result<f64> {
        self.advance(ReducerPhase::Finalized)?;
        Ok(self.estimate.value())
    }
}

/// Read-only inputs plus the shared accumulator, borrowed by every worker.
pub struct WorkerContext<'a, F: ?Sized, S> {
    params: &'a IntegrationParams,
    workers: WorkerCount,
    integrand: &'a F,
    estimate: &'a S,
}

impl<'a, F, S> WorkerContext<'a, F, S>
where
    F: Integrand + ?Sized,
    S: SharedEstimate,
{
    pub fn new(
        params: &'a IntegrationParams,
        workers: WorkerCount,
        integrand: &'a F,
        estimate: &'a S,
    ) -> Self {
        Self {
            params,
            workers,
            integrand,
            estimate,
        }
    }

    /// Body of worker `worker`: sum its interior samples, scale by `h`, and
    /// fold the result into the shared estimate.
    pub fn run(&self, worker: WorkerIndex) -> WorkerContribution {
        let range = partition::assign(worker, self.params.subdivisions(), self.workers);
        let mut local = LocalSum::for_worker(worker, self.params, self.integrand);
        for i in range.interior() {
            local.add(self.integrand.eval(self.params.sample(i)));
        }
        let contribution = local.scale(self.params.step());
        self.estimate.add(contribution);
        tracing::trace!(
            target: "engine",
            worker = worker.get(),
            start = range.start,
            end = range.end,
            contribution,
            "worker finished"
        );
        WorkerContribution {
            worker,
            range,
            contribution,
        }
    }
}

/// Parallel trapezoidal reducer over a fixed pool of workers.
#[derive(Debug, Clone, Default)]
pub struct Reducer {
    cfg: EngineConfig,
}

impl Reducer {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    pub fn run<F>(
        &self,
        params: &IntegrationParams,
        workers: WorkerCount,
        integrand: &F,
    ) -> Result<EstimateReport>
    where
        F: Integrand + ?Sized,
    {
        match self.cfg.accumulator {
            Accumulator::Locked => Self::reduce::<F, LockedEstimate>(params, workers, integrand),
            Accumulator::Atomic => Self::reduce::<F, AtomicEstimate>(params, workers, integrand),
        }
    }

    fn reduce<F, S>(
        params: &IntegrationParams,
        workers: WorkerCount,
        integrand: &F,
    ) -> Result<EstimateReport>
    where
        F: Integrand + ?Sized,
        S: SharedEstimate,
    {
        let mut reduction = Reduction::<S>::new();
        let started = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|idx| format!("trap-worker-{idx}"))
            .build()
            .map_err(|err| {
                EngineError::ResourceExhaustion(format!("failed to build worker pool: {err}"))
            })?;
        reduction.advance(ReducerPhase::WorkersSpawned)?;

        let ctx = WorkerContext::new(params, workers, integrand, &reduction.estimate);
        // Each pool thread runs the body exactly once and broadcast returns
        // only after all of them have.
        let joined = pool.broadcast(|bctx| workers.index(bctx.index()).map(|idx| ctx.run(idx)));
        let elapsed = started.elapsed();
        drop(pool);

        let contributions = collect_joined(joined, workers)?;
        reduction.advance(ReducerPhase::AllJoined)?;
        let estimate = reduction.finalize()?;

        let report = EstimateReport {
            lower: params.lower(),
            upper: params.upper(),
            subdivisions: params.subdivisions(),
            workers: workers.get(),
            estimate,
            elapsed,
            contributions,
        };
        tracing::debug!(target: "engine", elapsed = ?report.elapsed, "{}", report.summary());
        Ok(report)
    }
}

/// Every pool thread must have mapped to a worker index, and the pool must
/// have run exactly one body per worker.
fn collect_joined(
    joined: Vec<Option<WorkerContribution>>,
    workers: WorkerCount,
) -> Result<Vec<WorkerContribution>> {
    let contributions = joined
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| EngineError::other("pool thread outside the worker range"))?;
    if contributions.len() != workers.get() {
        return Err(EngineError::ResourceExhaustion(format!(
            "expected {} workers, pool ran {}",
            workers.get(),
            contributions.len()
        )));
    }
    Ok(contributions)
}

/// Estimate the integral of `x*x` over `[a, b]` with `n` trapezoids split
/// across `w` workers.
pub fn estimate_integral(a: f64, b: f64, n: i64, w: i64) -> Result<f64> {
    let params = IntegrationParams::new(a, b, n)?;
    let workers = WorkerCount::new(w)?;
    Reducer::default()
        .run(&params, workers, &Square)
        .map(|report| report.estimate)
}
