//! Init command - write an example cyclolens.toml

use anyhow::{Context, Result};
use console::style;
use cyclolens::config::{example_config, CONFIG_FILE_NAME};
use std::path::Path;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let workspace = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !workspace.is_dir() {
        anyhow::bail!("Path is not a directory: {}", workspace.display());
    }

    let config_path = workspace.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        return Ok(());
    }

    std::fs::write(&config_path, example_config())
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    println!("\nNext steps:");
    println!("  {} Check the analyzer", style("cyclolens doctor").cyan());
    println!("  {} Per-function report", style("cyclolens details .").cyan());
    println!("  {} Live indicator", style("cyclolens watch").cyan());

    Ok(())
}
