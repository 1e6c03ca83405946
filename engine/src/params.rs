use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, Result};

/// Interval bounds, subdivision count and the step derived from them.
///
/// The step `h = (b - a) / n` is fixed at construction. A reversed interval
/// (`a > b`) is accepted and yields a negative step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntegrationParams {
    lower: f64,
    upper: f64,
    subdivisions: u64,
    step: f64,
}

impl IntegrationParams {
    pub fn new(lower: f64, upper: f64, subdivisions: i64) -> Result<Self> {
        if subdivisions <= 0 {
            return Err(EngineError::InvalidPartition(subdivisions));
        }
        let subdivisions = subdivisions as u64;
        Ok(Self {
            lower,
            upper,
            subdivisions,
            step: (upper - lower) / subdivisions as f64,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn subdivisions(&self) -> u64 {
        self.subdivisions
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Sample point `a + i*h` for trapezoid index `i`.
    pub fn sample(&self, index: u64) -> f64 {
        self.lower + index as f64 * self.step
    }
}

/// Raw `a b n` triple as typed by the user, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRequest {
    pub lower: f64,
    pub upper: f64,
    pub subdivisions: i64,
}

impl IntegrationRequest {
    pub fn into_params(self) -> Result<IntegrationParams> {
        IntegrationParams::new(self.lower, self.upper, self.subdivisions)
    }
}
