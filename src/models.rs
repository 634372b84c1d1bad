//! Core data models for Cyclolens
//!
//! These models describe what gets asked of the analyzer and what comes
//! back from it.

use crate::scoring::Remark;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the analyzer should be run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// A single average score for the target
    Average,
    /// Per-function listing
    Full,
}

/// A single analyzer run: target path plus mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub target: PathBuf,
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    pub fn average(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            mode: AnalysisMode::Average,
        }
    }

    pub fn full(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            mode: AnalysisMode::Full,
        }
    }
}

/// One row of FULL-mode analyzer output.
///
/// `remark` is never read from the analyzer; it is filled in afterwards
/// by [`crate::analyzer::parse_records`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(rename = "PkgName")]
    pub package: String,
    #[serde(rename = "FuncName")]
    pub function: String,
    #[serde(rename = "Complexity")]
    pub complexity: u32,
    #[serde(rename = "MaintainabilityIndex")]
    pub maintainability_index: f64,
    #[serde(rename = "Remark", default, skip_deserializing)]
    pub remark: Option<Remark>,
}

/// Average score of the current target as reported by AVERAGE mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageScore {
    /// Text as the analyzer reported it
    pub text: String,
    /// Numeric value, when the text is a finite number
    pub value: Option<f64>,
}

impl AverageScore {
    pub fn from_number(value: f64) -> Self {
        Self {
            text: value.to_string(),
            value: value.is_finite().then_some(value),
        }
    }

    pub fn from_text(text: &str) -> Self {
        let text = text.trim().to_string();
        let value = text.parse::<f64>().ok().filter(|v| v.is_finite());
        Self { text, value }
    }
}

/// Result of an on-demand report: per-function records plus the average
/// shown in the header
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedAnalysis {
    pub records: Vec<AnalysisRecord>,
    pub average: Option<AverageScore>,
}

impl std::fmt::Display for AverageScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
