//! Static assignment of trapezoid indices to workers.
//!
//! Worker `r` of `w` owns the half-open range
//! `[floor(r*n/w), floor((r+1)*n/w))` of the `n` trapezoid indices. Ranges
//! are contiguous, disjoint and cover `0..n` for every `(n, w)`; when `w > n`
//! some ranges are empty.

use std::{num::NonZeroUsize, ops::Range};

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

/// Number of workers in a run. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerCount(NonZeroUsize);

impl WorkerCount {
    pub fn new(count: i64) -> Result<Self> {
        usize::try_from(count)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| {
                EngineError::InvalidWorkerCount(format!("expected a positive integer, got {count}"))
            })
    }

    /// Parse a base-10 worker count, as given on the command line.
    pub fn parse(raw: &str) -> Result<Self> {
        let count: i64 = raw.trim().parse().map_err(|err| {
            EngineError::InvalidWorkerCount(format!("{raw:?} is not an integer: {err}"))
        })?;
        Self::new(count)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Checked construction of an index belonging to this run.
    pub fn index(self, raw: usize) -> Option<WorkerIndex> {
        (raw < self.get()).then_some(WorkerIndex(raw))
    }

    pub fn indices(self) -> impl Iterator<Item = WorkerIndex> {
        (0..self.get()).map(WorkerIndex)
    }
}

/// Rank of a worker within its run, in `[0, w)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerIndex(usize);

impl WorkerIndex {
    pub fn get(self) -> usize {
        self.0
    }

    /// Worker 0 carries the endpoint-average term.
    pub fn is_first(self) -> bool {
        self.0 == 0
    }
}

/// Half-open range of trapezoid indices owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: u64,
    pub end: u64,
}

impl IndexRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn indices(&self) -> Range<u64> {
        self.start..self.end
    }

    /// Indices whose sample point is interior to `[a, b]`. Index 0 samples
    /// the left endpoint, which the endpoint-average term already covers.
    pub fn interior(&self) -> Range<u64> {
        self.start.max(1)..self.end
    }
}

/// Range owned by `worker` when `subdivisions` trapezoids are split `workers` ways.
pub fn assign(worker: WorkerIndex, subdivisions: u64, workers: WorkerCount) -> IndexRange {
    let bound = |rank: usize| -> u64 {
        // r*n can exceed u64 for large runs; the quotient never exceeds n.
        ((rank as u128 * subdivisions as u128) / workers.get() as u128) as u64
    };
    IndexRange {
        start: bound(worker.get()),
        end: bound(worker.get() + 1),
    }
}

/// Every worker's range, in worker order.
pub fn ranges(
    subdivisions: u64,
    workers: WorkerCount,
) -> impl Iterator<Item = (WorkerIndex, IndexRange)> {
    workers
        .indices()
        .map(move |worker| (worker, assign(worker, subdivisions, workers)))
}
