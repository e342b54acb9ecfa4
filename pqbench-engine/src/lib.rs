// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! pqbench Benchmark Engine
//!
//! Measures post-quantum KEMs and signature schemes resolved through the
//! provider registry of `pqbench-core`.
//!
//! # Run Phases
//!
//! - **Preflight**: baseline system CPU sample, warning above a threshold
//! - **Micro-benchmarks**: per-algorithm warmup, then timed keygen and
//!   encapsulate/decapsulate or sign/verify sweeps per size
//! - **Stability**: wall-clock bounded mixed workload over all algorithms
//! - **Finalize**: stop the resource monitor and persist the result document
//!
//! # Data Output
//!
//! Each run writes `benchmark_results_<timestamp>.json` and
//! `system_monitor_<timestamp>.json` into the configured output directory.

pub mod cancel;
pub mod error;
pub mod harness;
pub mod monitor;
pub mod report;
pub mod reporter;
pub mod runner;
pub mod stability;
pub mod stats;

pub use cancel::CancelToken;
pub use error::EngineError;
pub use harness::BenchmarkHarness;
pub use monitor::{
    sample_system_cpu, MonitorError, MonitorState, ProbeError, ResourceMonitor, ResourceProbe,
    ResourceSample, ResourceSummary, SysinfoProbe,
};
pub use report::{ResultDocument, ResultRecord, RunMetadata, SystemInfo};
pub use reporter::{JsonReporter, ReporterError};
pub use runner::{BenchmarkRunner, RunOutcome};
pub use stability::{CycleCounts, StabilityReport, StabilityTest};
pub use stats::{format_latency, StatSummary, StatsError};
