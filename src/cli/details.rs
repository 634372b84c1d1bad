//! `cyclolens details` - per-function report

use super::{runtime, Session};
use anyhow::{Context, Result};
use console::style;
use cyclolens::analyzer::run_details;
use cyclolens::presentation::TerminalPanel;
use cyclolens::reporters::{self, OutputFormat};
use std::path::Path;

pub fn run(session: &Session, format: Option<&str>, output: Option<&Path>) -> Result<()> {
    let format: OutputFormat = format
        .unwrap_or_else(|| session.config.report_format())
        .parse()?;

    let rt = runtime()?;
    let details = rt
        .block_on(run_details(
            &session.invoker,
            &session.target,
            session.config.remark_scale(),
        ))
        .with_context(|| format!("Analysis of {} failed", session.target.display()))?;

    let rendered = reporters::report(&details.records, details.average.as_ref(), format)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{}\n", rendered))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => reporters::present(&mut TerminalPanel::new(), &rendered),
    }
    Ok(())
}
