use tabled::{builder::Builder, Table};

use super::{has_spreads, headers, row};
use crate::data::Evaluation;

/// Render results as a text table, followed by any warnings.
pub fn render_table(evaluation: &Evaluation) -> String {
    if evaluation.is_empty() {
        return with_warnings("(no candidates)".to_string(), &evaluation.warnings);
    }

    let with_spreads = has_spreads(&evaluation.results);
    let mut builder = Builder::default();
    builder.push_record(headers(with_spreads));
    for result in &evaluation.results {
        builder.push_record(row(result, with_spreads));
    }

    let table = Table::from(builder);
    with_warnings(table.to_string(), &evaluation.warnings)
}

fn with_warnings(mut out: String, warnings: &[String]) -> String {
    if !warnings.is_empty() {
        out.push_str("\n\nWarnings:");
        for w in warnings {
            out.push_str("\n  - ");
            out.push_str(w);
        }
    }
    out
}

pub fn print_table(evaluation: &Evaluation) {
    println!("{}", render_table(evaluation));
}
