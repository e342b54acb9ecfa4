// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark run orchestration.
//!
//! Phases, in order: preflight CPU check, monitor start, per-algorithm
//! warmup and micro-benchmarks, the stability loop, and finalize. Finalize
//! always runs, including after cancellation, a phase error or a panic, so
//! every run leaves a result document behind.
//!
//! Failure policies differ per phase:
//! - warmup swallows every error,
//! - a failed or panicking timed call aborts that algorithm's
//!   micro-benchmarks only,
//! - the stability loop logs and counts failures and keeps going.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;

use pqbench_core::{AlgorithmHandle, AlgorithmSpec, Config, Operation, ProviderRegistry};

use crate::cancel::CancelToken;
use crate::error::EngineError;
use crate::harness::BenchmarkHarness;
use crate::monitor::{sample_system_cpu, ResourceMonitor};
use crate::report::{ResultDocument, ResultRecord};
use crate::reporter::JsonReporter;
use crate::stability::StabilityTest;

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub document: ResultDocument,
    pub results_path: PathBuf,
    /// Resource samples file, when the monitor ran and persisted
    pub monitor_path: Option<PathBuf>,
}

/// Drives one benchmark run from a validated configuration.
pub struct BenchmarkRunner {
    config: Config,
    registry: Arc<ProviderRegistry>,
    cancel: CancelToken,
}

impl BenchmarkRunner {
    pub fn new(config: Config, registry: Arc<ProviderRegistry>) -> Self {
        Self {
            config,
            registry,
            cancel: CancelToken::new(),
        }
    }

    /// Share a cancellation token with the caller.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every phase and persist the result document.
    ///
    /// Only failing to create the output directory or to write the result
    /// file is an error here; everything else is recorded in the document.
    pub fn run(&self) -> Result<RunOutcome, EngineError> {
        let reporter = JsonReporter::new(&self.config.execution.output_dir)?;

        let mut document = ResultDocument::new(self.config.clone());
        document.metadata.preflight_cpu_percent = Some(self.preflight());

        let monitor_path = reporter.monitor_path(document.metadata.start_time);
        let mut monitor = ResourceMonitor::new(self.config.monitoring.sampling_interval())
            .with_output(&monitor_path);
        let monitor_started = match monitor.start() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Resource monitor failed to start, continuing without it"
                );
                false
            }
        };

        let phases = panic::catch_unwind(AssertUnwindSafe(|| self.run_phases(&mut document)));
        let phase_error = match phases {
            Ok(result) => result.err(),
            Err(payload) => Some(EngineError::from_panic(payload)),
        };
        match &phase_error {
            None => {}
            Some(EngineError::Interrupted) => tracing::info!("Benchmark interrupted by user"),
            Some(e) => tracing::error!(error = %e, "Benchmark failed"),
        }

        self.finalize(
            document,
            monitor,
            monitor_started,
            phase_error.is_some(),
            &reporter,
        )
    }

    fn preflight(&self) -> f32 {
        let threshold = self.config.execution.preflight_cpu_threshold_percent;
        let usage = sample_system_cpu(self.config.execution.preflight_sample());

        if f64::from(usage) > threshold {
            tracing::warn!(
                cpu_percent = usage,
                threshold_percent = threshold,
                "High system CPU usage detected, benchmark results may be affected"
            );
        } else {
            tracing::info!(
                cpu_percent = usage,
                "System CPU usage is normal, starting benchmark"
            );
        }
        usage
    }

    fn run_phases(&self, document: &mut ResultDocument) -> Result<(), EngineError> {
        let execution = &self.config.execution;
        let harness = BenchmarkHarness::new()
            .warmup(execution.warmup_iterations)
            .iterations(execution.iterations)
            .keep_samples(execution.keep_raw_samples)
            .cancel_token(self.cancel.clone());

        let mut handles = Vec::with_capacity(self.config.algorithms.len());

        for spec in &self.config.algorithms {
            if self.cancel.is_cancelled() {
                return Err(EngineError::Interrupted);
            }

            let span = tracing::info_span!("algorithm", algorithm = %spec.name, kind = %spec.kind);
            let _enter = span.enter();

            let resolved = panic::catch_unwind(AssertUnwindSafe(|| self.registry.resolve(spec)))
                .map_err(EngineError::from_panic)
                .and_then(|resolved| resolved.map_err(EngineError::from));
            let mut handle = match resolved {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping algorithm");
                    document.record_failure(spec.name.as_str(), &e);
                    continue;
                }
            };

            tracing::info!(iterations = execution.warmup_iterations, "Warming up");
            let warmup_failures = harness.run_warmup(|| handle.keygen());
            if warmup_failures > 0 {
                tracing::debug!(failures = warmup_failures, "Warmup calls failed");
            }

            tracing::info!(iterations = execution.iterations, "Running micro-benchmarks");
            let mut record = ResultRecord::new();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                measure(&harness, &mut handle, spec, &mut record)
            }))
            .unwrap_or_else(|payload| Err(EngineError::from_panic(payload)));
            if !record.is_empty() {
                document
                    .micro_benchmarks
                    .insert(spec.name.to_string(), record);
            }

            match outcome {
                Ok(()) => {}
                Err(EngineError::Interrupted) => return Err(EngineError::Interrupted),
                Err(e) => {
                    tracing::error!(error = %e, "Micro-benchmarks aborted");
                    document.record_failure(spec.name.as_str(), &e);
                }
            }

            handles.push(handle);
        }

        let stability = StabilityTest::new(execution.long_run_duration())
            .cancel_token(self.cancel.clone())
            .run(&mut handles);
        let completed = stability.completed;
        document.stability = Some(stability);

        if completed {
            Ok(())
        } else {
            Err(EngineError::Interrupted)
        }
    }

    fn finalize(
        &self,
        mut document: ResultDocument,
        mut monitor: ResourceMonitor,
        monitor_started: bool,
        phases_failed: bool,
        reporter: &JsonReporter,
    ) -> Result<RunOutcome, EngineError> {
        let mut monitor_path = None;
        if monitor_started {
            match monitor.stop() {
                Ok(()) => monitor_path = monitor.output_path().map(PathBuf::from),
                Err(e) => tracing::error!(error = %e, "Failed to stop resource monitor"),
            }
            document.resource_summary = Some(monitor.summary());
        }

        document.metadata.end_time = Some(Utc::now());
        document.metadata.interrupted = phases_failed || self.cancel.is_cancelled();

        let results_path = reporter.save(&document)?;
        tracing::info!(path = %results_path.display(), "Results saved");

        Ok(RunOutcome {
            document,
            results_path,
            monitor_path,
        })
    }
}

impl std::fmt::Debug for BenchmarkRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkRunner")
            .field("algorithms", &self.config.algorithms.len())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Micro-benchmarks for one algorithm. Completed operations land in
/// `record` even when a later one fails.
fn measure(
    harness: &BenchmarkHarness,
    handle: &mut AlgorithmHandle,
    spec: &AlgorithmSpec,
    record: &mut ResultRecord,
) -> Result<(), EngineError> {
    let samples = harness.run(|| handle.keygen())?;
    record.insert(
        Operation::Keygen.record_key(None),
        harness.summarize(samples)?,
    );

    // One keypair for every remaining trial of this algorithm
    let keys = handle.keygen()?;

    match handle {
        AlgorithmHandle::Kem(kem) => {
            // Standard KEMs take no payload; the size only labels the record
            for &size in &spec.sizes {
                let (encaps, decaps) = harness.run_pair(
                    &mut *kem,
                    |kem| kem.encapsulate(&keys.public_key),
                    |kem, encapsulated| kem.decapsulate(&encapsulated.ciphertext, &keys.secret_key),
                )?;
                record.insert(
                    Operation::Encapsulate.record_key(Some(size)),
                    harness.summarize(encaps)?,
                );
                record.insert(
                    Operation::Decapsulate.record_key(Some(size)),
                    harness.summarize(decaps)?,
                );
                tracing::debug!(size = size.bytes(), "KEM size measured");
            }
        }
        AlgorithmHandle::Signature(signer) => {
            for &size in &spec.sizes {
                let mut message = vec![0u8; size.bytes()];
                rand::thread_rng().fill_bytes(&mut message);

                let (sign, verify) = harness.run_pair(
                    &mut *signer,
                    |signer| signer.sign(&message, &keys.secret_key),
                    |signer, signature| {
                        Ok(signer.verify(&keys.public_key, &message, signature))
                    },
                )?;
                record.insert(
                    Operation::Sign.record_key(Some(size)),
                    harness.summarize(sign)?,
                );
                record.insert(
                    Operation::Verify.record_key(Some(size)),
                    harness.summarize(verify)?,
                );
                tracing::debug!(size = size.bytes(), "Signature size measured");
            }
        }
    }

    Ok(())
}
