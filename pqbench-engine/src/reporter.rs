// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON persistence for result documents.
//!
//! Files are named `<kind>_<YYYY-MM-DDTHH-MM-SS.mmmZ>.json` using the run's
//! start time, so a result file and its resource-sample file pair up.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::report::ResultDocument;

const RESULTS_PREFIX: &str = "benchmark_results";
const MONITOR_PREFIX: &str = "system_monitor";

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON reporter for benchmark results.
#[derive(Debug, Clone)]
pub struct JsonReporter {
    /// Output directory for benchmark data
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter, creating the output directory if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| ReporterError::Io {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the result document for a run started at `started`.
    pub fn results_path(&self, started: DateTime<Utc>) -> PathBuf {
        self.stamped(RESULTS_PREFIX, started)
    }

    /// Path of the resource-sample document for a run started at `started`.
    pub fn monitor_path(&self, started: DateTime<Utc>) -> PathBuf {
        self.stamped(MONITOR_PREFIX, started)
    }

    fn stamped(&self, prefix: &str, started: DateTime<Utc>) -> PathBuf {
        let timestamp = started.format("%Y-%m-%dT%H-%M-%S%.3fZ");
        self.output_dir.join(format!("{}_{}.json", prefix, timestamp))
    }

    /// Save a result document to a JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, document: &ResultDocument) -> Result<PathBuf, ReporterError> {
        let filepath = self.results_path(document.metadata.start_time);

        let file = File::create(&filepath).map_err(|source| ReporterError::Io {
            path: filepath.clone(),
            source,
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, document)?;

        Ok(filepath)
    }

    /// Load an existing result document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<ResultDocument, ReporterError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReporterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatSummary;
    use chrono::TimeZone;
    use pqbench_core::ConfigLoader;
    use tempfile::TempDir;

    fn document() -> ResultDocument {
        let config = ConfigLoader::load_string(
            r#"
execution:
  warmup_iterations: 1
  long_run_duration_seconds: 0
monitoring:
  sampling_interval_seconds: 1
algorithms:
  sign:
    - name: ML-DSA-44
      implementation: pqcrypto
"#,
        )
        .unwrap();
        let mut doc = ResultDocument::new(config);
        doc.micro_benchmarks.entry("ML-DSA-44".to_string()).or_default().insert(
            "keygen".to_string(),
            StatSummary::from_samples(vec![100, 200, 300], false).unwrap(),
        );
        doc
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path().join("data")).unwrap();

        let doc = document();
        let path = reporter.save(&doc).unwrap();
        assert!(path.exists());

        let loaded = JsonReporter::load(&path).unwrap();
        assert_eq!(loaded.metadata.run_id, doc.metadata.run_id);
        assert_eq!(
            loaded.micro_benchmarks["ML-DSA-44"]["keygen"],
            doc.micro_benchmarks["ML-DSA-44"]["keygen"]
        );
    }

    #[test]
    fn test_file_names_share_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();
        let started = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap();

        assert_eq!(
            reporter.results_path(started).file_name().unwrap(),
            "benchmark_results_2025-03-01T12-30-05.000Z.json"
        );
        assert_eq!(
            reporter.monitor_path(started).file_name().unwrap(),
            "system_monitor_2025-03-01T12-30-05.000Z.json"
        );
    }

    #[test]
    fn test_runs_in_same_second_get_distinct_files() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();
        let first = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap();
        let second = first + chrono::Duration::milliseconds(250);

        assert_ne!(reporter.results_path(first), reporter.results_path(second));
        assert_eq!(
            reporter.results_path(second).file_name().unwrap(),
            "benchmark_results_2025-03-01T12-30-05.250Z.json"
        );

        let mut a = document();
        a.metadata.start_time = first;
        let mut b = document();
        b.metadata.start_time = second;
        let path_a = reporter.save(&a).unwrap();
        let path_b = reporter.save(&b).unwrap();
        assert_eq!(
            JsonReporter::load(&path_a).unwrap().metadata.run_id,
            a.metadata.run_id
        );
        assert_eq!(
            JsonReporter::load(&path_b).unwrap().metadata.run_id,
            b.metadata.run_id
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = JsonReporter::load("/nonexistent/benchmark_results.json").unwrap_err();
        assert!(matches!(err, ReporterError::Io { .. }));
    }
}
