//! Cherry picking.
//!
//! A cherry is a candidate that beats its neighbour on both counts: its strike
//! sits closer to the money and it pays a strictly higher premium than the
//! previous candidate of the same expiry.

use serde::{Deserialize, Serialize};

use crate::data::AnalysisResult;

/// How neighbours are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CherryMode {
    /// Sort by expiry then strike and compare within each expiry group.
    #[default]
    Grouped,
    /// Compare each row with the previous row in the order given. Kept for
    /// callers that pre-sort; results depend on input order.
    Sequential,
}

/// `current` dominates `previous` on distance from the money and premium.
fn dominates(previous: &AnalysisResult, current: &AnalysisResult) -> bool {
    current.percentage_from_strike.abs() < previous.percentage_from_strike.abs() && current.bid > previous.bid
}

/// Cherries among `results`.
///
/// Grouped mode returns them in expiry/strike order; sequential mode keeps
/// input order.
pub fn pick_cherries(results: &[AnalysisResult], mode: CherryMode) -> Vec<AnalysisResult> {
    match mode {
        CherryMode::Grouped => grouped(results),
        CherryMode::Sequential => sequential(results),
    }
}

fn sequential(results: &[AnalysisResult]) -> Vec<AnalysisResult> {
    results
        .windows(2)
        .filter(|pair| pair[0].exp_date == pair[1].exp_date && dominates(&pair[0], &pair[1]))
        .map(|pair| pair[1].clone())
        .collect()
}

fn grouped(results: &[AnalysisResult]) -> Vec<AnalysisResult> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| {
        a.exp_date_str
            .cmp(&b.exp_date_str)
            .then_with(|| a.strike_price.cmp(&b.strike_price))
    });

    sorted
        .chunk_by(|a, b| a.exp_date_str == b.exp_date_str)
        .flat_map(|group| {
            group
                .windows(2)
                .filter(|pair| dominates(&pair[0], &pair[1]))
                .map(|pair| pair[1].clone())
        })
        .collect()
}
