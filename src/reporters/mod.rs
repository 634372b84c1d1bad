//! Output reporters for analysis results
//!
//! Supports two output formats:
//! - `text` - threshold legends plus a fixed-column function table
//! - `json` - machine-readable records with derived remarks

mod json;
mod text;

pub use text::{render_report, render_table};

use crate::models::{AnalysisRecord, AverageScore};
use crate::presentation::Panel;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render records in the given format
pub fn report(
    records: &[AnalysisRecord],
    average: Option<&AverageScore>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_report(records, average)),
        OutputFormat::Json => json::render(records, average),
    }
}

/// Replace the panel's contents with `rendered` and bring it into view
pub fn present<P: Panel + ?Sized>(panel: &mut P, rendered: &str) {
    panel.clear();
    for line in rendered.lines() {
        panel.append_line(line);
    }
    panel.show();
}
