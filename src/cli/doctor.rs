//! Doctor command - check environment

use super::Session;
use anyhow::{bail, Result};
use console::style;
use cyclolens::analyzer::platform_id;
use std::path::{Path, PathBuf};

pub fn run(path: &Path, analyzer: Option<&Path>, no_emoji: bool) -> Result<()> {
    let icon = if no_emoji { "" } else { "🩺 " };
    println!("{}Cyclolens Doctor\n", icon);

    println!(
        "{} Platform: {} ({})",
        style("✓").green(),
        platform_id(),
        std::env::consts::ARCH
    );

    let session = Session::open(path, analyzer)?;
    println!(
        "{} Workspace: {}",
        style("✓").green(),
        style(session.workspace.display()).cyan()
    );

    let settings = session.invoker.settings();
    println!(
        "{} Remark scale: {}, timeout: {:?}",
        style("✓").green(),
        session.config.remark_scale(),
        settings.timeout
    );

    let executable = session.invoker.executable();
    match locate(&executable) {
        Some(found) => {
            println!(
                "{} Analyzer: {}",
                style("✓").green(),
                style(found.display()).cyan()
            );
        }
        None => {
            println!(
                "{} Analyzer: {} not found",
                style("✗").red(),
                executable.display()
            );
            println!(
                "  Install it with `go install github.com/fzipp/gocyclo/cmd/gocyclo@latest`,"
            );
            println!(
                "  put {}-{} under bin/, or pass --analyzer <path>",
                settings.binary_name,
                platform_id()
            );
            bail!("{} is not available", settings.binary_name);
        }
    }

    let done = if no_emoji { "" } else { "✅ " };
    println!("\n{}All checks passed!", done);
    Ok(())
}

/// Where `executable` actually lives: a path with a directory part must
/// exist as a file, a bare name is looked up on `PATH`.
fn locate(executable: &Path) -> Option<PathBuf> {
    if executable.components().count() > 1 || executable.is_absolute() {
        return executable.is_file().then(|| executable.to_path_buf());
    }
    which::which(executable).ok()
}
