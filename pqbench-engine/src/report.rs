// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result document schema.
//!
//! Layout:
//!
//! ```text
//! {
//!   "metadata": { run_id, start_time, end_time, platform, processor, system, interrupted, config },
//!   "micro_benchmarks": { "<algorithm>": { "<operation key>": StatSummary } },
//!   "stability": StabilityReport,
//!   "resource_summary": ResourceSummary,
//!   "failures": { "<algorithm>": "<cause>" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use uuid::Uuid;

use pqbench_core::Config;

use crate::monitor::ResourceSummary;
use crate::stability::StabilityReport;
use crate::stats::{format_latency, StatSummary};

/// Operation key (`keygen`, `encaps_size_32`, ...) to its statistics.
pub type ResultRecord = BTreeMap<String, StatSummary>;

/// Host system information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version
    pub kernel_version: Option<String>,
    /// CPU architecture
    pub arch: String,
    /// CPU model name
    pub cpu_model: String,
    /// Number of logical CPUs
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// Compact platform descriptor, e.g. `Linux-6.8.0-x86_64`.
    pub fn platform(&self) -> String {
        let version = self
            .kernel_version
            .as_deref()
            .unwrap_or(self.os_version.as_str());
        format!("{}-{}-{}", self.os, version, self.arch)
    }
}

/// Run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    /// pqbench version that produced the document
    pub version: String,
    pub start_time: DateTime<Utc>,
    /// Stamped at finalize
    pub end_time: Option<DateTime<Utc>>,
    pub platform: String,
    pub processor: String,
    pub system: SystemInfo,
    /// System CPU utilization sampled before measuring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preflight_cpu_percent: Option<f32>,
    /// Set when the run was cancelled or a phase failed unrecoverably
    #[serde(default)]
    pub interrupted: bool,
    /// Snapshot of the validated configuration
    pub config: Config,
}

impl RunMetadata {
    pub fn new(config: Config) -> Self {
        let system = SystemInfo::collect();
        Self {
            run_id: Uuid::new_v4(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Utc::now(),
            end_time: None,
            platform: system.platform(),
            processor: system.cpu_model.clone(),
            system,
            preflight_cpu_percent: None,
            interrupted: false,
            config,
        }
    }
}

/// Complete result document of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultDocument {
    pub metadata: RunMetadata,
    /// Algorithm name to its operation records
    pub micro_benchmarks: BTreeMap<String, ResultRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<StabilityReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_summary: Option<ResourceSummary>,
    /// Algorithms that were skipped or aborted, with the cause
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub failures: BTreeMap<String, String>,
}

impl ResultDocument {
    pub fn new(config: Config) -> Self {
        Self {
            metadata: RunMetadata::new(config),
            micro_benchmarks: BTreeMap::new(),
            stability: None,
            resource_summary: None,
            failures: BTreeMap::new(),
        }
    }

    pub fn record_failure(&mut self, algorithm: impl Into<String>, cause: impl ToString) {
        self.failures.insert(algorithm.into(), cause.to_string());
    }

    /// Human-readable latency table.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Summary");
        let _ = writeln!(out, "-------");

        for (algorithm, record) in &self.micro_benchmarks {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", algorithm);
            for (operation, stats) in record {
                let _ = writeln!(
                    out,
                    "  {:<20} mean={:>10}  median={:>10}  p99={:>10}  {:>12.1} ops/s",
                    operation,
                    format_latency(stats.mean_us),
                    format_latency(stats.median_us),
                    format_latency(stats.p99_us),
                    stats.throughput_ops_sec
                );
            }
        }

        if let Some(stability) = &self.stability {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Stability: {} passes in {:.1}s, {} errors{}",
                stability.passes,
                stability.elapsed_seconds,
                stability.total_errors(),
                if stability.completed { "" } else { " (incomplete)" }
            );
        }

        if let Some(resources) = &self.resource_summary {
            let _ = writeln!(
                out,
                "Resources: avg CPU {:.1}%, peak CPU {:.1}%, peak RSS {:.1} MiB",
                resources.avg_cpu_percent,
                resources.max_cpu_percent,
                resources.max_memory_rss as f64 / (1024.0 * 1024.0)
            );
        }

        for (algorithm, cause) in &self.failures {
            let _ = writeln!(out, "Failed: {} - {}", algorithm, cause);
        }

        if self.metadata.interrupted {
            let _ = writeln!(out, "Run was interrupted; results are partial.");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pqbench_core::ConfigLoader;

    fn config() -> Config {
        ConfigLoader::load_string(
            r#"
execution:
  warmup_iterations: 1
  long_run_duration_seconds: 0
monitoring:
  sampling_interval_seconds: 1
algorithms:
  kem:
    - name: ML-KEM-512
      implementation: pqcrypto
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_system_info_collect() {
        let info = SystemInfo::collect();
        assert!(info.cpu_cores > 0);
        assert!(info.memory_bytes > 0);
        assert!(info.platform().ends_with(std::env::consts::ARCH));
    }

    #[test]
    fn test_document_json_layout() {
        let mut doc = ResultDocument::new(config());
        let mut record = ResultRecord::new();
        record.insert(
            "keygen".to_string(),
            StatSummary::from_samples(vec![1_000, 2_000], false).unwrap(),
        );
        doc.micro_benchmarks.insert("ML-KEM-512".to_string(), record);

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["metadata"]["run_id"].is_string());
        assert!(json["metadata"]["end_time"].is_null());
        assert!(json["metadata"]["config"]["execution"].is_object());
        assert!(json["micro_benchmarks"]["ML-KEM-512"]["keygen"]["avg_us"].is_number());
        assert!(json.get("failures").is_none());
        assert!(json.get("stability").is_none());
    }

    #[test]
    fn test_render_summary() {
        let mut doc = ResultDocument::new(config());
        let mut record = ResultRecord::new();
        record.insert(
            "encaps_size_32".to_string(),
            StatSummary::from_samples(vec![12_000, 14_000], false).unwrap(),
        );
        doc.micro_benchmarks.insert("ML-KEM-512".to_string(), record);
        doc.record_failure("Kyber512", "Unknown algorithm");
        doc.metadata.interrupted = true;

        let text = doc.render_summary();
        assert!(text.contains("ML-KEM-512"));
        assert!(text.contains("encaps_size_32"));
        assert!(text.contains("13.00μs"));
        assert!(text.contains("Failed: Kyber512"));
        assert!(text.contains("interrupted"));
    }
}
