//! Ticker list input.
//!
//! One `symbol,threshold` pair per line. Blank lines and `#` comments are
//! ignored, and a leading header row (first column `symbol`, `ticker` or
//! `underlying`, second column not a number) is skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: missing {field}")]
    MissingField { line: u64, field: &'static str },

    #[error("Line {line}: invalid threshold '{value}'")]
    InvalidThreshold { line: u64, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A ticker to screen and its strike threshold as written in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerRequest {
    pub symbol: String,
    /// Below 1.0 a fraction of the current price; see `ThresholdMode` for
    /// values of 1.0 and above.
    pub threshold: Decimal,
}

/// Column names accepted for the symbol column of a header row.
const HEADER_NAMES: [&str; 3] = ["symbol", "ticker", "underlying"];

fn is_header(first_column: &str) -> bool {
    HEADER_NAMES.iter().any(|name| first_column.eq_ignore_ascii_case(name))
}

/// Parse ticker requests from any reader.
pub fn read_requests<R: Read>(reader: R) -> Result<Vec<TickerRequest>, InputError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut requests = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);

        let symbol = record.get(0).unwrap_or_default();
        if symbol.is_empty() {
            if record.iter().all(str::is_empty) {
                continue;
            }
            return Err(InputError::MissingField { line, field: "symbol" });
        }

        let raw = record.get(1).unwrap_or_default();
        if raw.is_empty() {
            return Err(InputError::MissingField {
                line,
                field: "threshold",
            });
        }

        let threshold = match Decimal::from_str(raw) {
            Ok(value) if value > Decimal::ZERO => value,
            Err(_) if idx == 0 && is_header(symbol) => continue,
            _ => {
                return Err(InputError::InvalidThreshold {
                    line,
                    value: raw.to_string(),
                })
            }
        };

        requests.push(TickerRequest {
            symbol: symbol.to_uppercase(),
            threshold,
        });
    }
    Ok(requests)
}

/// Load ticker requests from a file.
pub fn load_requests(path: &Path) -> Result<Vec<TickerRequest>, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound(path.display().to_string()));
    }
    read_requests(File::open(path)?)
}
