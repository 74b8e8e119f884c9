//! Call credit spread search.
//!
//! For each short call, a long call is bought further out of the money to cap
//! risk. The distance is tried at several widths (fractions of the short
//! strike) and the best-returning width is kept per short strike and expiry:
//! - Long leg: first listed strike at or above `short * (1 + width)`
//! - Long price: ask, or bid times a fallback multiplier when no ask is quoted
//! - Net credit and max risk must both be positive
//! - Annualized ROI on max risk must clear the minimum

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{sort_by_annualized_roi, AnalysisResult, OptionChain, SpreadDetails};
use crate::expiry::{days_until, market_today};
use crate::pricing::{annualized_roi, percentage_from_strike, roi, SETTLEMENT_DAYS};

use super::chain_filter::QuotedRow;

/// Width ladder searched by default: 1, 2, 3, 5, 7, 10, 15 and 20 percent.
pub fn default_spread_widths() -> Vec<Decimal> {
    [1, 2, 3, 5, 7, 10, 15, 20]
        .into_iter()
        .map(|pct| Decimal::new(pct, 2))
        .collect()
}

/// Configuration for spread search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadOptimizerConfig {
    /// Widths to try, as fractions of the short strike.
    pub spread_widths: Vec<Decimal>,
    /// Minimum annualized ROI in percent.
    pub min_annualized_roi: f64,
    /// Multiplier applied to the long bid when no usable ask is quoted.
    pub ask_fallback_multiplier: Decimal,
}

impl Default for SpreadOptimizerConfig {
    fn default() -> Self {
        Self {
            spread_widths: default_spread_widths(),
            min_annualized_roi: 15.0,
            ask_fallback_multiplier: Decimal::new(11, 1),
        }
    }
}

/// Builds call credit spreads from filtered call rows.
pub struct SpreadOptimizer {
    config: SpreadOptimizerConfig,
}

impl SpreadOptimizer {
    pub fn new(config: SpreadOptimizerConfig) -> Self {
        Self { config }
    }

    /// Best spread per (ticker, short strike, expiry) across the width ladder.
    pub fn optimize(&self, chain: &OptionChain, rows: &[QuotedRow<'_>], now: DateTime<Utc>) -> Vec<AnalysisResult> {
        let mut best: Vec<AnalysisResult> = Vec::new();
        let mut index: HashMap<(String, Decimal, String), usize> = HashMap::new();

        for width in &self.config.spread_widths {
            for candidate in self.spreads_at_width(chain, rows, *width, now) {
                let key = (
                    candidate.ticker.clone(),
                    candidate.strike_price,
                    candidate.exp_date_str.clone(),
                );
                match index.get(&key) {
                    Some(&i) => {
                        if candidate.annualized_roi > best[i].annualized_roi {
                            best[i] = candidate;
                        }
                    }
                    None => {
                        index.insert(key, best.len());
                        best.push(candidate);
                    }
                }
            }
        }

        sort_by_annualized_roi(&mut best);
        best
    }

    /// All qualifying spreads at a single width.
    pub fn spreads_at_width(
        &self,
        chain: &OptionChain,
        rows: &[QuotedRow<'_>],
        width: Decimal,
        now: DateTime<Utc>,
    ) -> Vec<AnalysisResult> {
        let today = market_today(now);
        let mut candidates = Vec::new();

        for (token, mut group) in group_by_expiry_token(rows) {
            let Some(expiry) = chain.expiry_groups.resolve_expiry(token, today) else {
                debug!("{}: no expiry group for '{}'", chain.ticker, token);
                continue;
            };
            let days = days_until(expiry.date, now);

            group.sort_by(|a, b| a.strike.cmp(&b.strike));

            for (i, short) in group.iter().enumerate() {
                if short.bid <= Decimal::ZERO {
                    continue;
                }

                let Some(target) = short.strike.checked_mul(Decimal::ONE + width) else {
                    debug!("{}: long target for {} out of range", chain.ticker, short.strike);
                    continue;
                };
                let Some(long) = group[i + 1..].iter().find(|r| r.strike >= target) else {
                    continue;
                };

                let Some(long_price) = self.long_leg_price(long) else {
                    continue;
                };
                let net_credit = short.bid - long_price;
                if net_credit <= Decimal::ZERO {
                    continue;
                }

                let max_risk = long.strike - short.strike - net_credit;
                if max_risk <= Decimal::ZERO {
                    continue;
                }

                let roi = roi(net_credit, max_risk);
                let annualized = annualized_roi(roi / 100.0, days + SETTLEMENT_DAYS);
                if annualized < self.config.min_annualized_roi {
                    continue;
                }

                candidates.push(AnalysisResult {
                    ticker: chain.ticker.clone(),
                    current_price: chain.current_price,
                    strike_price: short.strike,
                    exp_date: expiry.date,
                    exp_date_str: expiry.date.format("%Y-%m-%d").to_string(),
                    expiry_group: expiry.label.clone(),
                    days_to_expiration: days,
                    bid: net_credit,
                    percentage_from_strike: percentage_from_strike(short.strike, chain.current_price),
                    roi,
                    annualized_roi: annualized,
                    spread: Some(SpreadDetails {
                        width: width.to_f64().unwrap_or(0.0),
                        long_strike: long.strike,
                        long_price,
                        net_credit,
                        max_risk,
                    }),
                });
            }
        }

        candidates
    }

    fn long_leg_price(&self, long: &QuotedRow<'_>) -> Option<Decimal> {
        match long.ask {
            Some(ask) if ask > Decimal::ZERO => Some(ask),
            _ => long.bid.checked_mul(self.config.ask_fallback_multiplier),
        }
    }
}

/// Rows grouped by raw expiry token, groups in order of first appearance.
fn group_by_expiry_token<'r, 'a>(rows: &'r [QuotedRow<'a>]) -> Vec<(&'r str, Vec<&'r QuotedRow<'a>>)> {
    let mut groups: Vec<(&str, Vec<&QuotedRow<'a>>)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let token = row.expiry_token();
        let slot = *positions.entry(token).or_insert_with(|| {
            groups.push((token, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }
    groups
}
