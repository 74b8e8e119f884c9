//! Result rendering.

pub mod csv_out;
pub mod json;
pub mod table;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::AnalysisResult;

pub use json::ScreenReport;

/// Output format for the `screen` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Csv => "csv",
        };
        f.write_str(name)
    }
}

const BASE_COLUMNS: [&str; 9] = [
    "Ticker",
    "Price",
    "Strike",
    "Expiry",
    "DTE",
    "Bid",
    "% From Strike",
    "ROI %",
    "Annual ROI %",
];

const SPREAD_COLUMNS: [&str; 2] = ["Width %", "Long Strike"];

/// Column headers; spread columns are added when any result is a spread.
pub(crate) fn headers(with_spreads: bool) -> Vec<&'static str> {
    let mut columns = BASE_COLUMNS.to_vec();
    if with_spreads {
        columns.extend(SPREAD_COLUMNS);
    }
    columns
}

pub(crate) fn has_spreads(results: &[AnalysisResult]) -> bool {
    results.iter().any(|r| r.spread.is_some())
}

fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// One display row, in `headers` order.
pub(crate) fn row(result: &AnalysisResult, with_spreads: bool) -> Vec<String> {
    let mut cells = vec![
        result.ticker.clone(),
        money(result.current_price),
        money(result.strike_price),
        result.exp_date_str.clone(),
        result.days_to_expiration.to_string(),
        money(result.bid),
        format!("{:.2}", result.percentage_from_strike),
        format!("{:.2}", result.roi),
        format!("{:.2}", result.annualized_roi),
    ];
    if with_spreads {
        match &result.spread {
            Some(spread) => {
                cells.push(format!("{:.0}", spread.width_pct()));
                cells.push(money(spread.long_strike));
            }
            None => cells.extend([String::new(), String::new()]),
        }
    }
    cells
}
