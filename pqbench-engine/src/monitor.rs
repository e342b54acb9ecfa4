// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Background resource monitor.
//!
//! A dedicated thread samples process CPU, resident memory, system CPU and
//! (best effort) CPU frequency once per interval. The sample buffer is owned
//! by that thread and handed back when it is joined.
//!
//! Lifecycle: `Idle -> Running -> Stopped`. A monitor is not restartable.

use std::fs::File;
use std::io::BufWriter;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sysinfo::{CpuRefreshKind, Pid, System};
use thiserror::Error;

use crate::error::panic_message;

/// Errors from monitor lifecycle operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Monitor cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: MonitorState,
    },

    #[error("Failed to spawn sampling thread: {reason}")]
    Spawn { reason: String },

    #[error("Sampling thread panicked")]
    ThreadPanicked,

    #[error("Failed to persist resource samples to {path}: {reason}")]
    Persist { path: PathBuf, reason: String },
}

/// Failures of a single probe read.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The observed process no longer exists; sampling ends.
    #[error("Observed process is gone")]
    ProcessGone,

    /// Any other per-tick failure; the tick is skipped.
    #[error("Resource sample failed: {0}")]
    Sample(String),
}

/// Monitor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

/// One resource reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Unix time in seconds
    pub timestamp: f64,
    /// Process CPU utilization since the previous read (may exceed 100 on
    /// multi-core hosts)
    pub cpu_percent: f32,
    /// Resident set size in bytes
    pub memory_rss: u64,
    /// System-wide CPU utilization
    pub system_cpu_percent: f32,
    /// Current CPU frequency in MHz, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_freq_current: Option<u64>,
}

/// Aggregate over a monitor's samples. All zero when nothing was sampled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub samples: usize,
    pub avg_cpu_percent: f64,
    pub max_cpu_percent: f64,
    pub avg_memory_rss: f64,
    pub max_memory_rss: u64,
}

impl ResourceSummary {
    pub fn from_samples(samples: &[ResourceSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len() as f64;
        let cpu_sum: f64 = samples.iter().map(|s| s.cpu_percent as f64).sum();
        let max_cpu = samples
            .iter()
            .map(|s| s.cpu_percent as f64)
            .fold(f64::MIN, f64::max);
        let mem_sum: u128 = samples.iter().map(|s| s.memory_rss as u128).sum();
        let max_mem = samples.iter().map(|s| s.memory_rss).max().unwrap_or(0);

        Self {
            samples: samples.len(),
            avg_cpu_percent: cpu_sum / n,
            max_cpu_percent: max_cpu,
            avg_memory_rss: mem_sum as f64 / n,
            max_memory_rss: max_mem,
        }
    }
}

/// Source of resource readings, one call per tick.
pub trait ResourceProbe: Send + 'static {
    fn sample(&mut self) -> Result<ResourceSample, ProbeError>;
}

/// [`ResourceProbe`] for the current process, backed by `sysinfo`.
pub struct SysinfoProbe {
    system: System,
    pid: Pid,
}

impl SysinfoProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let pid = sysinfo::get_current_pid().map_err(|e| ProbeError::Sample(e.to_string()))?;
        Ok(Self {
            system: System::new(),
            pid,
        })
    }
}

impl ResourceProbe for SysinfoProbe {
    fn sample(&mut self) -> Result<ResourceSample, ProbeError> {
        self.system
            .refresh_cpu_specifics(CpuRefreshKind::everything());
        if !self.system.refresh_process(self.pid) {
            return Err(ProbeError::ProcessGone);
        }
        let process = self.system.process(self.pid).ok_or(ProbeError::ProcessGone)?;

        let cpu_freq_current = self
            .system
            .cpus()
            .first()
            .map(|cpu| cpu.frequency())
            .filter(|&mhz| mhz > 0);

        Ok(ResourceSample {
            timestamp: unix_seconds(),
            cpu_percent: process.cpu_usage(),
            memory_rss: process.memory(),
            system_cpu_percent: self.system.global_cpu_info().cpu_usage(),
            cpu_freq_current,
        })
    }
}

/// Measure system-wide CPU utilization over `window`.
///
/// The window is stretched to sysinfo's minimum refresh interval when
/// shorter.
pub fn sample_system_cpu(window: Duration) -> f32 {
    let mut system = System::new();
    let usage_only = CpuRefreshKind::new().with_cpu_usage();
    system.refresh_cpu_specifics(usage_only);
    thread::sleep(window.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
    system.refresh_cpu_specifics(usage_only);
    system.global_cpu_info().cpu_usage()
}

fn unix_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<Vec<ResourceSample>>,
}

/// Periodic resource sampler running on its own thread.
pub struct ResourceMonitor {
    interval: Duration,
    output_path: Option<PathBuf>,
    probe: Option<Box<dyn ResourceProbe>>,
    state: MonitorState,
    worker: Option<Worker>,
    samples: Vec<ResourceSample>,
}

impl ResourceMonitor {
    /// Create an idle monitor sampling the current process via `sysinfo`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            output_path: None,
            probe: None,
            state: MonitorState::Idle,
            worker: None,
            samples: Vec::new(),
        }
    }

    /// Use a custom probe instead of [`SysinfoProbe`].
    pub fn with_probe(mut self, probe: impl ResourceProbe) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Persist the sample sequence as a JSON array to `path` on stop.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Spawn the sampling thread. Only valid from `Idle`.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.state != MonitorState::Idle {
            return Err(MonitorError::InvalidState {
                action: "start",
                state: self.state,
            });
        }

        let mut probe = match self.probe.take() {
            Some(probe) => probe,
            None => Box::new(SysinfoProbe::new().map_err(|e| MonitorError::Spawn {
                reason: e.to_string(),
            })?),
        };

        let interval = self.interval;
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let span = tracing::info_span!(
            "resource_monitor",
            interval_ms = interval.as_millis() as u64
        );

        let handle = thread::Builder::new()
            .name("resource-monitor".to_string())
            .spawn(move || {
                let _enter = span.enter();
                let mut samples = Vec::new();
                loop {
                    let tick = panic::catch_unwind(AssertUnwindSafe(|| probe.sample()))
                        .unwrap_or_else(|payload| {
                            Err(ProbeError::Sample(format!(
                                "sampler panicked: {}",
                                panic_message(payload.as_ref())
                            )))
                        });
                    match tick {
                        Ok(sample) => samples.push(sample),
                        Err(ProbeError::ProcessGone) => {
                            tracing::warn!("Observed process is gone, sampling ends");
                            break;
                        }
                        Err(e) => tracing::warn!(error = %e, "Resource sample skipped"),
                    }

                    // Stop message or dropped sender both end the loop
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                tracing::debug!(samples = samples.len(), "Sampling thread exiting");
                samples
            })
            .map_err(|e| MonitorError::Spawn {
                reason: e.to_string(),
            })?;

        self.worker = Some(Worker { stop_tx, handle });
        self.state = MonitorState::Running;
        tracing::info!(interval_secs = interval.as_secs_f64(), "Resource monitor started");
        Ok(())
    }

    /// Signal the sampling thread, wait for it to exit, then persist the
    /// samples if an output path is set.
    ///
    /// Calling `stop` on a monitor that is not running is a no-op.
    pub fn stop(&mut self) -> Result<(), MonitorError> {
        let Some(worker) = self.worker.take() else {
            self.state = MonitorState::Stopped;
            return Ok(());
        };
        self.state = MonitorState::Stopped;

        // The thread may already have exited on its own
        let _ = worker.stop_tx.send(());
        self.samples = worker
            .handle
            .join()
            .map_err(|_| MonitorError::ThreadPanicked)?;

        tracing::info!(samples = self.samples.len(), "Resource monitor stopped");

        if let Some(path) = &self.output_path {
            persist(path, &self.samples)?;
            tracing::info!(path = %path.display(), "Resource samples saved");
        }
        Ok(())
    }

    /// Samples collected by a stopped monitor.
    pub fn samples(&self) -> &[ResourceSample] {
        &self.samples
    }

    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary::from_samples(&self.samples)
    }
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
        }
    }
}

impl std::fmt::Debug for ResourceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMonitor")
            .field("interval", &self.interval)
            .field("state", &self.state)
            .field("samples", &self.samples.len())
            .finish()
    }
}

fn persist(path: &Path, samples: &[ResourceSample]) -> Result<(), MonitorError> {
    let persist_error = |reason: String| MonitorError::Persist {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| persist_error(e.to_string()))?;
    }
    let file = File::create(path).map_err(|e| persist_error(e.to_string()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), samples)
        .map_err(|e| persist_error(e.to_string()))
}
