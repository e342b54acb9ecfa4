// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `pqbench validate` command - Validate configuration file.
//!
//! Also reports whether each configured algorithm resolves to a provider,
//! since unresolvable algorithms are skipped at run time rather than
//! rejected up front.

use std::path::Path;

use pqbench_core::{ConfigLoader, ProviderRegistry};

pub async fn execute(file: &Path) -> anyhow::Result<()> {
    tracing::info!(file = %file.display(), "Validating configuration");

    let config = match ConfigLoader::load_file(file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Configuration is valid");
    println!();
    println!("Execution Settings:");
    println!(
        "  Output Directory:   {}",
        config.execution.output_dir.display()
    );
    println!("  Warmup Iterations:  {}", config.execution.warmup_iterations);
    println!("  Timed Iterations:   {}", config.execution.iterations);
    println!(
        "  Stability Phase:    {}s",
        config.execution.long_run_duration_seconds
    );
    println!(
        "  Sampling Interval:  {}s",
        config.monitoring.sampling_interval_seconds
    );
    println!();

    let registry = ProviderRegistry::with_builtin()?;
    println!("Algorithms ({}):", config.algorithms.len());
    for spec in &config.algorithms {
        let sizes: Vec<String> = spec.sizes.iter().map(|s| s.to_string()).collect();
        let status = match registry.resolve(spec) {
            Ok(_) => "available".to_string(),
            Err(e) => format!("will be skipped: {}", e),
        };
        println!(
            "  - {} [{}] via {} (sizes: {}) - {}",
            spec.name,
            spec.kind,
            spec.implementation,
            sizes.join(", "),
            status
        );
    }

    Ok(())
}
