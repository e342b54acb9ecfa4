// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `pqbench show` command - Print a saved result document.

use std::path::Path;

use anyhow::Context;
use pqbench_engine::JsonReporter;

pub async fn execute(file: &Path) -> anyhow::Result<()> {
    let document = JsonReporter::load(file)
        .with_context(|| format!("loading results from {}", file.display()))?;
    let metadata = &document.metadata;

    println!("Run:       {}", metadata.run_id);
    println!("Version:   {}", metadata.version);
    println!("Started:   {}", metadata.start_time.to_rfc3339());
    match metadata.end_time {
        Some(end) => {
            let elapsed = end - metadata.start_time;
            println!(
                "Finished:  {} ({:.1}s)",
                end.to_rfc3339(),
                elapsed.num_milliseconds() as f64 / 1000.0
            );
        }
        None => println!("Finished:  -"),
    }
    println!("Platform:  {}", metadata.platform);
    println!("Processor: {}", metadata.processor);
    if let Some(cpu) = metadata.preflight_cpu_percent {
        println!("Preflight: {:.1}% system CPU", cpu);
    }
    println!();
    print!("{}", document.render_summary());

    Ok(())
}
