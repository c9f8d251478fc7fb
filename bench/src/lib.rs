//! Benchmark utilities for the Cadence engine.
//!
//! Provides the component types and seeded world populations shared by the criterion
//! benchmarks under `benches/`.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p cadence_bench
//!
//! # Run specific benchmark group
//! cargo bench -p cadence_bench -- query
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod population;
