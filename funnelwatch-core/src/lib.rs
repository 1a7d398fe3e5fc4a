// funnelwatch-core/src/lib.rs

// 1. Documentation is optional for now
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for the metric source, the snapshot store and report delivery.
pub mod ports;

// 2. Domain (Business core)
// Funnel definition, drop-off math, aggregation, anomaly checks, benchmarks.
// Depends on NOTHING else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Filesystem snapshot store, export source, YAML config, minijinja, outbox.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (Collect, Aggregate, Report, Status).
// Depends on the Domain, the Infra and the Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use funnelwatch_core::FunnelError;
pub use error::FunnelError;
