// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark harness for running and timing provider operations.
//!
//! Only the provider call itself sits inside the timed window. Cancellation
//! is checked before each trial, never while the clock is running.

use std::hint::black_box;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use pqbench_core::AdapterError;

use crate::cancel::CancelToken;
use crate::error::{panic_message, EngineError};
use crate::stats::{StatSummary, StatsError};

/// A benchmark harness for measuring operation latency.
#[derive(Debug, Clone)]
pub struct BenchmarkHarness {
    /// Number of untimed warmup calls
    warmup_iterations: u64,
    /// Number of timed trials per operation
    measurement_iterations: u64,
    /// Whether summaries keep raw sample data
    keep_raw_samples: bool,
    cancel: CancelToken,
}

impl BenchmarkHarness {
    /// Create a new benchmark harness with default settings.
    pub fn new() -> Self {
        Self {
            warmup_iterations: 10,
            measurement_iterations: 100,
            keep_raw_samples: false,
            cancel: CancelToken::new(),
        }
    }

    /// Set the number of warmup iterations.
    pub fn warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Set the number of measurement iterations.
    pub fn iterations(mut self, iterations: u64) -> Self {
        self.measurement_iterations = iterations;
        self
    }

    /// Set whether to keep raw sample data.
    pub fn keep_samples(mut self, keep: bool) -> Self {
        self.keep_raw_samples = keep;
        self
    }

    /// Observe `token` between trials.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn measurement_iterations(&self) -> u64 {
        self.measurement_iterations
    }

    /// Call `operation` for the configured warmup count, discarding results.
    ///
    /// Every failure is swallowed, panics included. Returns how many calls
    /// failed.
    pub fn run_warmup<T, F>(&self, mut operation: F) -> u64
    where
        F: FnMut() -> Result<T, AdapterError>,
    {
        let mut failures = 0;
        for _ in 0..self.warmup_iterations {
            if self.cancel.is_cancelled() {
                break;
            }
            match panic::catch_unwind(AssertUnwindSafe(&mut operation)) {
                Ok(result) => {
                    if black_box(result).is_err() {
                        failures += 1;
                    }
                }
                Err(payload) => {
                    failures += 1;
                    tracing::debug!(
                        panic = %panic_message(payload.as_ref()),
                        "Warmup call panicked"
                    );
                }
            }
        }
        failures
    }

    /// Time `operation` once per trial and collect latency samples in
    /// nanoseconds.
    ///
    /// The first failed call aborts the measurement and its error is
    /// returned; samples taken so far are discarded.
    pub fn run<T, F>(&self, mut operation: F) -> Result<Vec<u64>, EngineError>
    where
        F: FnMut() -> Result<T, AdapterError>,
    {
        let mut samples = Vec::with_capacity(self.measurement_iterations as usize);
        for _ in 0..self.measurement_iterations {
            self.check_cancelled()?;

            let start = Instant::now();
            let result = operation();
            let elapsed = start.elapsed();

            black_box(result?);
            samples.push(elapsed.as_nanos() as u64);
        }
        Ok(samples)
    }

    /// Time two dependent operations per trial.
    ///
    /// Each trial times `first`, then times `second` on the value `first`
    /// produced. Both operations get mutable access to `state`; the two
    /// timings are recorded independently.
    pub fn run_pair<S, A, B, F, G>(
        &self,
        state: &mut S,
        mut first: F,
        mut second: G,
    ) -> Result<(Vec<u64>, Vec<u64>), EngineError>
    where
        S: ?Sized,
        F: FnMut(&mut S) -> Result<A, AdapterError>,
        G: FnMut(&mut S, &A) -> Result<B, AdapterError>,
    {
        let capacity = self.measurement_iterations as usize;
        let mut first_samples = Vec::with_capacity(capacity);
        let mut second_samples = Vec::with_capacity(capacity);

        for _ in 0..self.measurement_iterations {
            self.check_cancelled()?;

            let start = Instant::now();
            let produced = first(state);
            let first_elapsed = start.elapsed();
            let produced = produced?;

            let start = Instant::now();
            let result = second(state, &produced);
            let second_elapsed = start.elapsed();
            black_box(result?);

            first_samples.push(first_elapsed.as_nanos() as u64);
            second_samples.push(second_elapsed.as_nanos() as u64);
        }

        Ok((first_samples, second_samples))
    }

    /// Summarize samples honoring the harness' raw sample setting.
    pub fn summarize(&self, samples: Vec<u64>) -> Result<StatSummary, StatsError> {
        StatSummary::from_samples(samples, self.keep_raw_samples)
    }

    fn check_cancelled(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Interrupted)
        } else {
            Ok(())
        }
    }
}

impl Default for BenchmarkHarness {
    fn default() -> Self {
        Self::new()
    }
}
