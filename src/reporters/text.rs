//! Text reporter: threshold legends plus a fixed-column function table

use crate::models::{AnalysisRecord, AverageScore};
use crate::scoring::{legend, Scale};

const HEADERS: [&str; 5] = [
    "PkgName",
    "FuncName",
    "Complexity",
    "MaintainabilityIndex",
    "Remark",
];

/// Columns holding numbers are right-aligned
const NUMERIC: [bool; 5] = [false, false, true, true, false];

/// Render the full report: average line, both legends, then the table.
pub fn render_report(records: &[AnalysisRecord], average: Option<&AverageScore>) -> String {
    let average = average.map_or_else(|| "n/a".to_string(), |a| a.to_string());

    let mut out = String::new();
    out.push_str(&format!("Average Cyclomatic Complexity: {}\n\n", average));
    out.push_str("Cyclomatic Complexity Thresholds:\n");
    out.push_str(&legend(Scale::Cyclomatic));
    out.push_str("\n\n");
    out.push_str("Maintainability Index Thresholds:\n");
    out.push_str(&legend(Scale::Maintainability));
    out.push_str("\n\n");
    out.push_str("Function Level Analysis\n");
    out.push_str(&render_table(records));
    out
}

/// Render records as an aligned table, preserving their order.
pub fn render_table(records: &[AnalysisRecord]) -> String {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.package.clone(),
                r.function.clone(),
                r.complexity.to_string(),
                r.maintainability_index.to_string(),
                r.remark.map_or_else(|| "N/A".to_string(), |rem| rem.to_string()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&HEADERS.map(String::from), &widths, false));
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+"),
    );
    out.push('\n');
    for row in &rows {
        out.push_str(&format_row(row, &widths, true));
    }
    out
}

fn format_row(cells: &[String; 5], widths: &[usize; 5], align_numbers: bool) -> String {
    let line = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let pad = widths[i].saturating_sub(cell.chars().count());
            if align_numbers && NUMERIC[i] {
                format!(" {}{} ", " ".repeat(pad), cell)
            } else {
                format!(" {}{} ", cell, " ".repeat(pad))
            }
        })
        .collect::<Vec<_>>()
        .join("|");
    format!("{}\n", line.trim_end())
}
