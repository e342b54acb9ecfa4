// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! The configuration is validated once, before any measurement starts.
//! Any invalid field results in a HardValidationError that aborts the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult, HardValidationError};
use crate::types::{AlgorithmKind, AlgorithmName, MessageSize};

/// Upper bound for the stability phase: one week
const MAX_LONG_RUN_SECONDS: f64 = 7.0 * 24.0 * 3600.0;

/// Raw execution section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawExecutionConfig {
    #[serde(default = "default_output_dir")]
    output_dir: String,
    warmup_iterations: u64,
    #[serde(default = "default_iterations")]
    iterations: u64,
    long_run_duration_seconds: f64,
    #[serde(default = "default_preflight_threshold")]
    preflight_cpu_threshold_percent: f64,
    #[serde(default = "default_preflight_sample_seconds")]
    preflight_sample_seconds: f64,
    #[serde(default)]
    keep_raw_samples: bool,
}

fn default_output_dir() -> String {
    "data".to_string()
}

fn default_iterations() -> u64 {
    1000
}

fn default_preflight_threshold() -> f64 {
    20.0
}

fn default_preflight_sample_seconds() -> f64 {
    1.0
}

/// Raw monitoring section.
#[derive(Debug, Deserialize)]
struct RawMonitoringConfig {
    sampling_interval_seconds: f64,
}

/// Raw logging section.
#[derive(Debug, Deserialize)]
struct RawLoggingConfig {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default)]
    file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RawLoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawKemEntry {
    name: String,
    implementation: String,
    #[serde(default = "default_sizes")]
    payload_sizes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct RawSignEntry {
    name: String,
    implementation: String,
    #[serde(default = "default_sizes")]
    message_sizes: Vec<usize>,
}

fn default_sizes() -> Vec<usize> {
    vec![32]
}

#[derive(Debug, Default, Deserialize)]
struct RawAlgorithms {
    #[serde(default)]
    kem: Vec<RawKemEntry>,
    #[serde(default)]
    sign: Vec<RawSignEntry>,
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    execution: RawExecutionConfig,
    monitoring: RawMonitoringConfig,
    #[serde(default)]
    logging: RawLoggingConfig,
    algorithms: RawAlgorithms,
}

/// Validated execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub output_dir: PathBuf,
    pub warmup_iterations: u64,
    /// Timed trials per operation.
    pub iterations: u64,
    pub long_run_duration_seconds: f64,
    pub preflight_cpu_threshold_percent: f64,
    pub preflight_sample_seconds: f64,
    pub keep_raw_samples: bool,
}

impl ExecutionConfig {
    /// Wall-clock budget of the stability phase.
    pub fn long_run_duration(&self) -> Duration {
        Duration::from_secs_f64(self.long_run_duration_seconds)
    }

    /// Window over which the preflight CPU sample is taken.
    pub fn preflight_sample(&self) -> Duration {
        Duration::from_secs_f64(self.preflight_sample_seconds)
    }
}

/// Validated resource monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub sampling_interval_seconds: f64,
}

impl MonitoringConfig {
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sampling_interval_seconds)
    }
}

/// Validated logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// One configured algorithm: which primitive, from which provider, and
/// which payload/message sizes to sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmSpec {
    pub name: AlgorithmName,
    pub kind: AlgorithmKind,
    pub implementation: String,
    pub sizes: Vec<MessageSize>,
}

/// Complete validated configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub execution: ExecutionConfig,
    pub monitoring: MonitoringConfig,
    pub logging: LoggingConfig,
    /// KEMs first, then signature schemes, each in file order.
    pub algorithms: Vec<AlgorithmSpec>,
}

impl Config {
    /// Iterate the configured specs of one kind.
    pub fn algorithms_of(&self, kind: AlgorithmKind) -> impl Iterator<Item = &AlgorithmSpec> {
        self.algorithms.iter().filter(move |spec| spec.kind == kind)
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<Config> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| BenchError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> BenchResult<Config> {
        let execution = Self::validate_execution(raw.execution)?;
        let monitoring = Self::validate_monitoring(raw.monitoring)?;
        let logging = Self::validate_logging(raw.logging)?;

        let mut algorithms = Vec::with_capacity(raw.algorithms.kem.len() + raw.algorithms.sign.len());
        for (index, entry) in raw.algorithms.kem.into_iter().enumerate() {
            algorithms.push(Self::validate_algorithm(
                AlgorithmKind::Kem,
                entry.name,
                entry.implementation,
                entry.payload_sizes,
                index,
            )?);
        }
        for (index, entry) in raw.algorithms.sign.into_iter().enumerate() {
            algorithms.push(Self::validate_algorithm(
                AlgorithmKind::Signature,
                entry.name,
                entry.implementation,
                entry.message_sizes,
                index,
            )?);
        }

        if algorithms.is_empty() {
            return Err(HardValidationError::SchemaValidation {
                message: "At least one algorithm must be configured under algorithms.kem or algorithms.sign"
                    .to_string(),
            }
            .into());
        }

        // Names key the result document, so they must be unique across both lists
        let mut seen = HashSet::new();
        for spec in &algorithms {
            if !seen.insert(spec.name.as_str()) {
                return Err(HardValidationError::DuplicateAlgorithm {
                    name: spec.name.to_string(),
                }
                .into());
            }
        }

        Ok(Config {
            execution,
            monitoring,
            logging,
            algorithms,
        })
    }

    fn validate_execution(raw: RawExecutionConfig) -> BenchResult<ExecutionConfig> {
        if raw.output_dir.trim().is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "output_dir",
                context: "execution".to_string(),
            }
            .into());
        }

        if raw.warmup_iterations > 1_000_000 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "warmup_iterations",
                value: raw.warmup_iterations.to_string(),
                reason: "Must not exceed 1000000".to_string(),
            }
            .into());
        }

        if raw.iterations == 0 || raw.iterations > 10_000_000 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "iterations",
                value: raw.iterations.to_string(),
                reason: "Must be between 1 and 10000000".to_string(),
            }
            .into());
        }

        if !raw.long_run_duration_seconds.is_finite()
            || raw.long_run_duration_seconds < 0.0
            || raw.long_run_duration_seconds > MAX_LONG_RUN_SECONDS
        {
            return Err(HardValidationError::InvalidFieldValue {
                field: "long_run_duration_seconds",
                value: raw.long_run_duration_seconds.to_string(),
                reason: format!("Must be between 0 and {} seconds", MAX_LONG_RUN_SECONDS),
            }
            .into());
        }

        if !(0.0..=100.0).contains(&raw.preflight_cpu_threshold_percent) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "preflight_cpu_threshold_percent",
                value: raw.preflight_cpu_threshold_percent.to_string(),
                reason: "Must be a percentage between 0 and 100".to_string(),
            }
            .into());
        }

        if !(0.0..=60.0).contains(&raw.preflight_sample_seconds) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "preflight_sample_seconds",
                value: raw.preflight_sample_seconds.to_string(),
                reason: "Must be between 0 and 60 seconds".to_string(),
            }
            .into());
        }

        Ok(ExecutionConfig {
            output_dir: PathBuf::from(raw.output_dir),
            warmup_iterations: raw.warmup_iterations,
            iterations: raw.iterations,
            long_run_duration_seconds: raw.long_run_duration_seconds,
            preflight_cpu_threshold_percent: raw.preflight_cpu_threshold_percent,
            preflight_sample_seconds: raw.preflight_sample_seconds,
            keep_raw_samples: raw.keep_raw_samples,
        })
    }

    fn validate_monitoring(raw: RawMonitoringConfig) -> BenchResult<MonitoringConfig> {
        // NaN fails the range check as well
        if !(raw.sampling_interval_seconds > 0.0 && raw.sampling_interval_seconds <= 3600.0) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "sampling_interval_seconds",
                value: raw.sampling_interval_seconds.to_string(),
                reason: "Must be greater than 0 and at most 3600 seconds".to_string(),
            }
            .into());
        }

        Ok(MonitoringConfig {
            sampling_interval_seconds: raw.sampling_interval_seconds,
        })
    }

    fn validate_logging(raw: RawLoggingConfig) -> BenchResult<LoggingConfig> {
        let level = raw.level.to_ascii_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            return Err(HardValidationError::InvalidFieldValue {
                field: "level",
                value: raw.level,
                reason: "Must be one of trace, debug, info, warn, error".to_string(),
            }
            .into());
        }

        Ok(LoggingConfig {
            level,
            file: raw.file.map(PathBuf::from),
        })
    }

    fn validate_algorithm(
        kind: AlgorithmKind,
        name: String,
        implementation: String,
        sizes: Vec<usize>,
        index: usize,
    ) -> BenchResult<AlgorithmSpec> {
        let context = format!("algorithms.{}[{}]", kind, index);

        let name = AlgorithmName::new(name)?;

        if implementation.trim().is_empty() {
            return Err(HardValidationError::MissingRequiredField {
                field: "implementation",
                context,
            }
            .into());
        }

        let sizes_field = match kind {
            AlgorithmKind::Kem => "payload_sizes",
            AlgorithmKind::Signature => "message_sizes",
        };

        if sizes.is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: sizes_field,
                value: "[]".to_string(),
                reason: format!("At least one size is required in {}", context),
            }
            .into());
        }

        let mut validated: Vec<MessageSize> = Vec::with_capacity(sizes.len());
        for bytes in sizes {
            let size = MessageSize::new(bytes).map_err(|e| match e {
                HardValidationError::InvalidFieldValue { value, reason, .. } => {
                    HardValidationError::InvalidFieldValue {
                        field: sizes_field,
                        value,
                        reason,
                    }
                }
                other => other,
            })?;
            if validated.contains(&size) {
                return Err(HardValidationError::InvalidFieldValue {
                    field: sizes_field,
                    value: size.to_string(),
                    reason: format!("Duplicate size in {}", context),
                }
                .into());
            }
            validated.push(size);
        }

        Ok(AlgorithmSpec {
            name,
            kind,
            implementation,
            sizes: validated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
execution:
  output_dir: results
  warmup_iterations: 100
  iterations: 500
  long_run_duration_seconds: 60

monitoring:
  sampling_interval_seconds: 0.5

logging:
  level: debug
  file: logs/pqbench.log

algorithms:
  kem:
    - name: ML-KEM-512
      implementation: pqcrypto
      payload_sizes: [32, 1024]
  sign:
    - name: ML-DSA-44
      implementation: pqcrypto
      message_sizes: [32, 1024, 4096]
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.algorithms.len(), 2);
        assert_eq!(config.algorithms[0].name.as_str(), "ML-KEM-512");
        assert_eq!(config.algorithms[0].kind, AlgorithmKind::Kem);
        assert_eq!(config.algorithms[1].sizes.len(), 3);
        assert_eq!(config.execution.iterations, 500);
        assert_eq!(config.monitoring.sampling_interval(), Duration::from_millis(500));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.algorithms_of(AlgorithmKind::Signature).count(), 1);
    }

    #[test]
    fn test_defaults_applied() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: 5
monitoring:
  sampling_interval_seconds: 1
algorithms:
  kem:
    - name: ML-KEM-768
      implementation: pqcrypto
"#;
        let config = ConfigLoader::load_string(yaml).unwrap();
        assert_eq!(config.execution.output_dir, PathBuf::from("data"));
        assert_eq!(config.execution.iterations, 1000);
        assert_eq!(config.execution.preflight_cpu_threshold_percent, 20.0);
        assert!(!config.execution.keep_raw_samples);
        assert_eq!(config.algorithms[0].sizes, vec![MessageSize::new(32).unwrap()]);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_missing_required_section() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: 5
algorithms:
  kem:
    - name: ML-KEM-768
      implementation: pqcrypto
"#;
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(result, Err(BenchError::ConfigParse { .. })));
    }

    #[test]
    fn test_no_algorithms() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: 5
monitoring:
  sampling_interval_seconds: 1
algorithms: {}
"#;
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(result, Err(BenchError::HardValidation(_))));
    }

    #[test]
    fn test_duplicate_names_across_kinds() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: 5
monitoring:
  sampling_interval_seconds: 1
algorithms:
  kem:
    - name: Same
      implementation: pqcrypto
  sign:
    - name: Same
      implementation: pqcrypto
"#;
        let result = ConfigLoader::load_string(yaml);
        assert!(matches!(
            result,
            Err(BenchError::HardValidation(
                HardValidationError::DuplicateAlgorithm { .. }
            ))
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  iterations: 0
  long_run_duration_seconds: 5
monitoring:
  sampling_interval_seconds: 1
algorithms:
  kem:
    - name: ML-KEM-768
      implementation: pqcrypto
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_invalid_sampling_interval() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: 5
monitoring:
  sampling_interval_seconds: 0
algorithms:
  kem:
    - name: ML-KEM-768
      implementation: pqcrypto
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_negative_long_run_rejected() {
        let yaml = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: -1
monitoring:
  sampling_interval_seconds: 1
algorithms:
  kem:
    - name: ML-KEM-768
      implementation: pqcrypto
"#;
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_bad_sizes_rejected() {
        let empty = r#"
execution:
  warmup_iterations: 10
  long_run_duration_seconds: 5
monitoring:
  sampling_interval_seconds: 1
algorithms:
  sign:
    - name: ML-DSA-44
      implementation: pqcrypto
      message_sizes: []
"#;
        assert!(ConfigLoader::load_string(empty).is_err());

        let zero = empty.replace("[]", "[0]");
        assert!(ConfigLoader::load_string(&zero).is_err());

        let duplicate = empty.replace("[]", "[32, 32]");
        assert!(ConfigLoader::load_string(&duplicate).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let yaml = VALID_CONFIG.replace("level: debug", "level: loud");
        assert!(ConfigLoader::load_string(&yaml).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_file("/nonexistent/pqbench.yaml");
        assert!(matches!(result, Err(BenchError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, VALID_CONFIG).unwrap();

        let config = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(config.execution.output_dir, PathBuf::from("results"));
    }
}
