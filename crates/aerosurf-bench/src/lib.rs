//! # aerosurf-bench
//!
//! Benchmark suite for the surface meshing pipeline.
//!
//! Provides 4 procedural benchmark scenarios, per-stage timing,
//! and CSV export for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
