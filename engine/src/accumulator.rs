use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::{integrand::Integrand, params::IntegrationParams, partition::WorkerIndex};

/// Worker-private running total.
///
/// Only obtainable through constructors that set a defined starting value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSum {
    value: f64,
}

impl LocalSum {
    pub fn zero() -> Self {
        Self { value: 0.0 }
    }

    pub fn seeded(seed: f64) -> Self {
        Self { value: seed }
    }

    /// Starting value for `worker`: the endpoint average `(f(a) + f(b)) / 2`
    /// for worker 0, exactly zero for everyone else.
    pub fn for_worker<F>(worker: WorkerIndex, params: &IntegrationParams, integrand: &F) -> Self
    where
        F: Integrand + ?Sized,
    {
        if worker.is_first() {
            Self::seeded((integrand.eval(params.lower()) + integrand.eval(params.upper())) / 2.0)
        } else {
            Self::zero()
        }
    }

    pub fn add(&mut self, term: f64) {
        self.value += term;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Multiply the whole sum by the step, once, after the summation loop.
    pub fn scale(self, step: f64) -> f64 {
        self.value * step
    }
}

/// Accumulator shared by all workers of a run. Starts at zero.
pub trait SharedEstimate: Default + Send + Sync {
    /// Add a worker's contribution. At most one add is in progress at a time.
    fn add(&self, contribution: f64);

    fn value(&self) -> f64;
}

/// Mutex-guarded estimate; the critical section is a single add-and-store.
#[derive(Debug, Default)]
pub struct LockedEstimate {
    total: Mutex<f64>,
}

impl SharedEstimate for LockedEstimate {
    fn add(&self, contribution: f64) {
        *self.total.lock() += contribution;
    }

    fn value(&self) -> f64 {
        *self.total.lock()
    }
}

/// Lock-free estimate holding the f64 bit pattern, updated by a CAS loop.
#[derive(Debug)]
pub struct AtomicEstimate {
    bits: AtomicU64,
}

impl Default for AtomicEstimate {
    fn default() -> Self {
        Self {
            bits: AtomicU64::new(0.0f64.to_bits()),
        }
    }
}

impl SharedEstimate for AtomicEstimate {
    fn add(&self, contribution: f64) {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + contribution).to_bits();
            match self
                .bits
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }
}
