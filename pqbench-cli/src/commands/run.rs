// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `pqbench run` command - Run the benchmark suite.
//!
//! The engine is synchronous and runs on a blocking thread. Ctrl-C trips
//! its cancellation token; the run then stops at the next step boundary
//! and still writes its (partial) results.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pqbench_core::{Config, ConfigLoader, ProviderRegistry};
use pqbench_engine::{BenchmarkRunner, CancelToken};

use crate::logging;

const QUICK_WARMUP_ITERATIONS: u64 = 10;
const QUICK_ITERATIONS: u64 = 100;
const QUICK_LONG_RUN_SECONDS: f64 = 5.0;

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub iterations: Option<u64>,
    pub quick: bool,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        let execution = &mut config.execution;
        if self.quick {
            execution.warmup_iterations = execution.warmup_iterations.min(QUICK_WARMUP_ITERATIONS);
            execution.iterations = execution.iterations.min(QUICK_ITERATIONS);
            execution.long_run_duration_seconds =
                execution.long_run_duration_seconds.min(QUICK_LONG_RUN_SECONDS);
        }
        // An explicit count wins over --quick
        if let Some(iterations) = self.iterations {
            execution.iterations = iterations;
        }
        if let Some(dir) = &self.output_dir {
            execution.output_dir = dir.clone();
        }
    }
}

pub async fn execute(config_path: &Path, verbose: bool, overrides: Overrides) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load_file(config_path)
        .with_context(|| format!("loading configuration {}", config_path.display()))?;
    overrides.apply(&mut config);

    logging::init(verbose, Some(&config.logging))?;
    tracing::info!(
        config = %config_path.display(),
        algorithms = config.algorithms.len(),
        iterations = config.execution.iterations,
        "Starting PQC benchmark suite"
    );

    let registry = ProviderRegistry::new_shared()?;
    let token = CancelToken::new();
    let runner = BenchmarkRunner::new(config, registry).with_cancel_token(token.clone());

    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received interrupt signal, stopping after the current step");
            token.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || runner.run())
        .await
        .context("benchmark thread failed")??;
    signal_task.abort();

    println!();
    print!("{}", outcome.document.render_summary());
    println!();
    println!("Results saved to: {}", outcome.results_path.display());
    if let Some(path) = &outcome.monitor_path {
        println!("Resource samples:  {}", path.display());
    }

    tracing::info!("Benchmark process finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        ConfigLoader::load_string(
            r#"
execution:
  output_dir: data
  warmup_iterations: 500
  iterations: 5000
  long_run_duration_seconds: 600
monitoring:
  sampling_interval_seconds: 1
algorithms:
  kem:
    - name: ML-KEM-768
      implementation: pqcrypto
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_quick_caps_workload() {
        let mut config = config();
        Overrides {
            quick: true,
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.execution.warmup_iterations, 10);
        assert_eq!(config.execution.iterations, 100);
        assert_eq!(config.execution.long_run_duration_seconds, 5.0);
    }

    #[test]
    fn test_explicit_overrides_win() {
        let mut config = config();
        Overrides {
            output_dir: Some(PathBuf::from("/tmp/pqbench-out")),
            iterations: Some(42),
            quick: true,
        }
        .apply(&mut config);

        assert_eq!(config.execution.iterations, 42);
        assert_eq!(config.execution.output_dir, PathBuf::from("/tmp/pqbench-out"));
    }

    #[test]
    fn test_no_overrides_is_identity() {
        let mut config = config();
        Overrides::default().apply(&mut config);
        assert_eq!(config.execution.iterations, 5000);
        assert_eq!(config.execution.output_dir, PathBuf::from("data"));
    }
}
