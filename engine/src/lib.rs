//! Composite trapezoidal-rule integration split across a fixed pool of
//! workers whose partial sums are combined under mutual exclusion.

pub mod accumulator;
pub mod config;
pub mod errors;
pub mod integrand;
pub mod io;
pub mod params;
pub mod partition;
pub mod reducer;
pub mod telemetry;

pub use accumulator::{AtomicEstimate, LocalSum, LockedEstimate, SharedEstimate};
pub use config::{Accumulator, EngineConfig, ReportConfig};
pub use errors::EngineError;
pub use integrand::{Integrand, Square};
pub use params::{IntegrationParams, IntegrationRequest};
pub use partition::{IndexRange, WorkerCount, WorkerIndex};
pub use reducer::{estimate_integral, EstimateReport, Reducer, WorkerContribution};
