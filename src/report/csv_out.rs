use std::io::{self, Write};

use super::{has_spreads, headers, row};
use crate::data::AnalysisResult;

/// Write results as CSV with the same columns as the table.
pub fn write_csv<W: Write>(writer: W, results: &[AnalysisResult]) -> csv::Result<()> {
    let with_spreads = has_spreads(results);
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers(with_spreads))?;
    for result in results {
        wtr.write_record(row(result, with_spreads))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_csv(results: &[AnalysisResult]) -> csv::Result<()> {
    write_csv(io::stdout().lock(), results)
}
