//! Parsing analyzer stdout
//!
//! AVERAGE mode prints `{"average": <number-or-string>}`; FULL mode prints a
//! JSON array of per-function records.

use super::{AnalysisError, AnalysisResult};
use crate::models::{AnalysisRecord, AverageScore};
use crate::scoring::{classify, Scale};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Parse AVERAGE-mode output.
pub fn parse_average(stdout: &str) -> AnalysisResult<AverageScore> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::MalformedOutput("empty output".to_string()));
    }

    let value: JsonValue = serde_json::from_str(trimmed)
        .map_err(|e| AnalysisError::MalformedOutput(format!("invalid JSON: {}", e)))?;

    match value.get("average") {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .map(AverageScore::from_number)
            .ok_or_else(|| AnalysisError::MalformedOutput(format!("unrepresentable average {}", n))),
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Ok(AverageScore::from_text(s)),
        Some(other) => Err(AnalysisError::MalformedOutput(format!(
            "unexpected average value: {}",
            other
        ))),
        None => Err(AnalysisError::MalformedOutput(
            "missing \"average\" field".to_string(),
        )),
    }
}

/// Parse FULL-mode output and derive each record's remark on `scale`.
///
/// Records keep the order the analyzer emitted them in. A record whose
/// score is out of range keeps `remark: None`.
pub fn parse_records(stdout: &str, scale: Scale) -> AnalysisResult<Vec<AnalysisRecord>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::MalformedOutput("empty output".to_string()));
    }

    let mut records: Vec<AnalysisRecord> = serde_json::from_str(trimmed)
        .map_err(|e| AnalysisError::MalformedOutput(format!("invalid record list: {}", e)))?;

    for record in &mut records {
        let score = match scale {
            Scale::Cyclomatic => f64::from(record.complexity),
            Scale::Maintainability => record.maintainability_index,
        };
        record.remark = match classify(score, scale) {
            Ok(remark) => Some(remark),
            Err(e) => {
                debug!("{}.{}: {}", record.package, record.function, e);
                None
            }
        };
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Remark;

    #[test]
    fn test_average_number() {
        let avg = parse_average(r#"{"average": 4.5}"#).unwrap();
        assert_eq!(avg.text, "4.5");
        assert_eq!(avg.value, Some(4.5));
    }

    #[test]
    fn test_average_string() {
        let avg = parse_average("{\"average\": \"3.20\"}\n").unwrap();
        assert_eq!(avg.text, "3.20");
        assert_eq!(avg.value, Some(3.2));
    }

    #[test]
    fn test_average_malformed() {
        for input in ["", "   ", "garbage", "[]", r#"{"avg": 1}"#, r#"{"average": null}"#, r#"{"average": ""}"#] {
            assert!(
                matches!(parse_average(input), Err(AnalysisError::MalformedOutput(_))),
                "input {:?} should be malformed",
                input
            );
        }
    }

    #[test]
    fn test_records_keep_emitted_order() {
        let json = r#"[
            {"PkgName":"b","FuncName":"Zed","Complexity":45,"MaintainabilityIndex":10},
            {"PkgName":"a","FuncName":"Alpha","Complexity":1,"MaintainabilityIndex":99}
        ]"#;
        let records = parse_records(json, Scale::Maintainability).unwrap();
        let names: Vec<_> = records.iter().map(|r| r.function.as_str()).collect();
        assert_eq!(names, vec!["Zed", "Alpha"]);
        assert_eq!(records[0].remark, Some(Remark::Insane));
        assert_eq!(records[1].remark, Some(Remark::Excellent));
    }

    #[test]
    fn test_remark_scale_choice_is_pinned() {
        let json = r#"[{"PkgName":"main","FuncName":"Run","Complexity":12,"MaintainabilityIndex":55}]"#;
        let by_mi = parse_records(json, Scale::Maintainability).unwrap();
        assert_eq!(by_mi[0].remark, Some(Remark::Complex));
        let by_cc = parse_records(json, Scale::Cyclomatic).unwrap();
        assert_eq!(by_cc[0].remark, Some(Remark::Moderate));
    }

    #[test]
    fn test_out_of_range_score_has_no_remark() {
        let json = r#"[{"PkgName":"main","FuncName":"init","Complexity":1,"MaintainabilityIndex":0}]"#;
        let records = parse_records(json, Scale::Maintainability).unwrap();
        assert_eq!(records[0].remark, None);
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_records("[]", Scale::Maintainability).unwrap().is_empty());
    }

    #[test]
    fn test_records_malformed() {
        assert!(matches!(
            parse_records(r#"{"average": 1}"#, Scale::Maintainability),
            Err(AnalysisError::MalformedOutput(_))
        ));
        assert!(matches!(
            parse_records(r#"[{"PkgName":"x"}]"#, Scale::Maintainability),
            Err(AnalysisError::MalformedOutput(_))
        ));
    }
}
