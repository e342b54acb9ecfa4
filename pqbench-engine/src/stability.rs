// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Long-running mixed workload.
//!
//! Every pass runs one full operation cycle (fresh keys, then
//! encapsulate/decapsulate or sign/verify) on each pooled handle until the
//! wall-clock budget is spent. Failures and panics are counted per
//! algorithm and never stop the loop. The deadline is checked before every cycle, so the
//! overshoot is bounded by a single cycle.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use pqbench_core::AlgorithmHandle;

use crate::cancel::CancelToken;
use crate::error::panic_message;

/// Message length for signature cycles.
const STABILITY_MESSAGE_LEN: usize = 32;

/// Per-algorithm counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCounts {
    /// Cycles attempted
    pub cycles: u64,
    /// Cycles that failed or did not round-trip
    pub errors: u64,
}

/// Outcome of the stability phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub configured_seconds: f64,
    pub elapsed_seconds: f64,
    /// Full passes over every handle
    pub passes: u64,
    /// True when the loop ran until its deadline
    pub completed: bool,
    pub algorithms: BTreeMap<String, CycleCounts>,
}

impl StabilityReport {
    pub fn total_errors(&self) -> u64 {
        self.algorithms.values().map(|c| c.errors).sum()
    }
}

/// Wall-clock bounded stability loop.
#[derive(Debug, Clone)]
pub struct StabilityTest {
    duration: Duration,
    cancel: CancelToken,
}

impl StabilityTest {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            cancel: CancelToken::new(),
        }
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cycle through `handles` until the deadline or cancellation.
    pub fn run(&self, handles: &mut [AlgorithmHandle]) -> StabilityReport {
        let mut report = StabilityReport {
            configured_seconds: self.duration.as_secs_f64(),
            ..Default::default()
        };

        if handles.is_empty() || self.duration.is_zero() {
            tracing::info!(
                algorithms = handles.len(),
                "Stability test skipped, nothing to run"
            );
            report.completed = true;
            return report;
        }

        tracing::info!(
            duration_secs = self.duration.as_secs_f64(),
            algorithms = handles.len(),
            "Starting long-running stability test"
        );

        for handle in handles.iter() {
            report
                .algorithms
                .insert(handle.name().to_string(), CycleCounts::default());
        }

        let start = Instant::now();
        let deadline = start + self.duration;

        'passes: loop {
            for handle in handles.iter_mut() {
                if self.cancel.is_cancelled() {
                    tracing::warn!("Stability test interrupted");
                    break 'passes;
                }
                if Instant::now() >= deadline {
                    report.completed = true;
                    break 'passes;
                }

                let message: [u8; STABILITY_MESSAGE_LEN] = rand::random();
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| handle.run_cycle(&message)));

                let counts = report
                    .algorithms
                    .entry(handle.name().to_string())
                    .or_default();
                counts.cycles += 1;
                match outcome {
                    Ok(Ok(true)) => {}
                    Ok(Ok(false)) => {
                        counts.errors += 1;
                        tracing::error!(
                            algorithm = %handle.name(),
                            "Stability cycle did not round-trip"
                        );
                    }
                    Ok(Err(e)) => {
                        counts.errors += 1;
                        tracing::error!(
                            algorithm = %handle.name(),
                            error = %e,
                            "Error in stability test"
                        );
                    }
                    Err(payload) => {
                        counts.errors += 1;
                        tracing::error!(
                            algorithm = %handle.name(),
                            panic = %panic_message(payload.as_ref()),
                            "Stability cycle panicked"
                        );
                    }
                }
            }

            report.passes += 1;
            if report.passes % 100 == 0 {
                tracing::debug!(
                    elapsed_secs = start.elapsed().as_secs(),
                    passes = report.passes,
                    "Stability test progress"
                );
            }
        }

        report.elapsed_seconds = start.elapsed().as_secs_f64();
        tracing::info!(
            passes = report.passes,
            errors = report.total_errors(),
            completed = report.completed,
            "Stability test finished"
        );
        report
    }
}
