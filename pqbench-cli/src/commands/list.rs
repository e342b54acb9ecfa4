// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `pqbench list` command - List algorithms with a registered provider.

use pqbench_core::ProviderRegistry;

pub async fn execute() -> anyhow::Result<()> {
    let registry = ProviderRegistry::with_builtin()?;
    let entries = registry.entries();

    if entries.is_empty() {
        println!("No algorithms registered.");
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                    REGISTERED ALGORITHMS                     ║");
    println!("╠═══════════════════════════════╦════════╦═════════════════════╣");
    println!("║ Algorithm                     ║ Kind   ║ Implementation      ║");
    println!("╠═══════════════════════════════╬════════╬═════════════════════╣");

    for entry in &entries {
        println!(
            "║ {:<29} ║ {:<6} ║ {:<19} ║",
            entry.name.as_str(),
            entry.kind.name(),
            entry.implementation
        );
    }

    println!("╚═══════════════════════════════╩════════╩═════════════════════╝");
    println!();
    println!("Total: {} binding(s)", entries.len());

    Ok(())
}
