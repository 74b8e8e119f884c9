use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::{AnalysisResult, Evaluation, OptionSide};

/// JSON envelope for a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenReport {
    pub generated_at: DateTime<Utc>,
    pub side: OptionSide,
    pub count: usize,
    pub warnings: Vec<String>,
    pub results: Vec<AnalysisResult>,
}

impl ScreenReport {
    pub fn new(evaluation: Evaluation, side: OptionSide, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            side,
            count: evaluation.results.len(),
            warnings: evaluation.warnings,
            results: evaluation.results,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Pretty-print the report to stdout.
pub fn print_json(report: &ScreenReport) {
    match report.to_json() {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
