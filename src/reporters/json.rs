//! JSON reporter

use crate::models::{AnalysisRecord, AverageScore};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    average: Option<&'a str>,
    functions: &'a [AnalysisRecord],
}

/// Render records (with derived remarks) as pretty JSON
pub fn render(records: &[AnalysisRecord], average: Option<&AverageScore>) -> Result<String> {
    let report = JsonReport {
        average: average.map(|a| a.text.as_str()),
        functions: records,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
