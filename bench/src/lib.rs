//! Benchmark utilities for the strata storage layer.
//!
//! This crate provides the shared fixtures of the storage benchmarks:
//!
//! - **Value types**: small plain structs standing in for real objects and components
//! - **Class setup**: a registry with an asset hierarchy and an entity/component split
//! - **Churn plans**: seeded, reproducible create/remove sequences
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p strata_bench
//!
//! # Run specific benchmark group
//! cargo bench -p strata_bench -- allocator
//! ```
//!
//! # Benchmark Results
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod churn;
pub mod fixtures;
