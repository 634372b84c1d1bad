//! Severity remarks for complexity and maintainability scores
//!
//! Both scales are fixed band tables. The threshold legends printed in
//! reports are generated from the same tables so the two never disagree.

use crate::analyzer::AnalysisError;
use serde::{Deserialize, Serialize};

/// Which metric a score belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Cyclomatic complexity (lower is better)
    Cyclomatic,
    /// Maintainability index (higher is better)
    #[default]
    Maintainability,
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scale::Cyclomatic => write!(f, "cyclomatic"),
            Scale::Maintainability => write!(f, "maintainability"),
        }
    }
}

/// Severity label derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Remark {
    Excellent,
    Good,
    Moderate,
    Complex,
    ExtremelyComplex,
    Insane,
}

impl std::fmt::Display for Remark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Remark::Excellent => write!(f, "EXCELLENT"),
            Remark::Good => write!(f, "GOOD"),
            Remark::Moderate => write!(f, "MODERATE"),
            Remark::Complex => write!(f, "COMPLEX"),
            Remark::ExtremelyComplex => write!(f, "EXTREMELY COMPLEX"),
            Remark::Insane => write!(f, "INSANE"),
        }
    }
}

/// One threshold band. `upper` is inclusive; `None` means unbounded.
struct Band {
    lower: u32,
    upper: Option<u32>,
    remark: Remark,
}

const CYCLOMATIC_BANDS: &[Band] = &[
    Band { lower: 1, upper: Some(10), remark: Remark::Good },
    Band { lower: 11, upper: Some(20), remark: Remark::Moderate },
    Band { lower: 21, upper: Some(30), remark: Remark::Complex },
    Band { lower: 31, upper: Some(40), remark: Remark::ExtremelyComplex },
    Band { lower: 41, upper: None, remark: Remark::Insane },
];

const MAINTAINABILITY_BANDS: &[Band] = &[
    Band { lower: 1, upper: Some(20), remark: Remark::Insane },
    Band { lower: 21, upper: Some(40), remark: Remark::ExtremelyComplex },
    Band { lower: 41, upper: Some(60), remark: Remark::Complex },
    Band { lower: 61, upper: Some(80), remark: Remark::Good },
    Band { lower: 81, upper: None, remark: Remark::Excellent },
];

fn bands(scale: Scale) -> &'static [Band] {
    match scale {
        Scale::Cyclomatic => CYCLOMATIC_BANDS,
        Scale::Maintainability => MAINTAINABILITY_BANDS,
    }
}

/// Map a score to its remark on the given scale.
///
/// Scores below 1, NaN and infinities are rejected with
/// [`AnalysisError::InvalidScore`]. A fractional score lands in the first
/// band whose upper bound it does not exceed, so 10.5 is `MODERATE` on the
/// cyclomatic scale.
pub fn classify(score: f64, scale: Scale) -> Result<Remark, AnalysisError> {
    if !score.is_finite() || score < 1.0 {
        return Err(AnalysisError::InvalidScore(score));
    }

    bands(scale)
        .iter()
        .find(|band| band.upper.map_or(true, |upper| score <= f64::from(upper)))
        .map(|band| band.remark)
        .ok_or(AnalysisError::InvalidScore(score))
}

/// Render the threshold legend for a scale, e.g.
/// `1-10: GOOD | 11-20: MODERATE | ... | 41+: INSANE`
pub fn legend(scale: Scale) -> String {
    bands(scale)
        .iter()
        .map(|band| match band.upper {
            Some(upper) => format!("{}-{}: {}", band.lower, upper, band.remark),
            None => format!("{}+: {}", band.lower, band.remark),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
