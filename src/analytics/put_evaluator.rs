//! Cash-secured put evaluation.
//!
//! Scores each filtered put by the return of selling it and holding the
//! collateral to expiry:
//! - Expiry token resolved against the chain's expiry groups
//! - Days to expiration on the Eastern calendar
//! - ROI via the configured strategy, annualized via the configured model
//! - Hard cutoff on annualized ROI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{sort_by_annualized_roi, AnalysisResult, Evaluation, OptionChain};
use crate::expiry::{days_until, market_today, raw_days_until};
use crate::pricing::{percentage_from_strike, AnnualizationModel, RoiStrategy};

use super::chain_filter::QuotedRow;

/// Configuration for put evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutEvaluatorConfig {
    /// Minimum annualized ROI in percent; rows below are dropped.
    pub min_annualized_roi: f64,
    /// ROI formula.
    pub roi_strategy: RoiStrategy,
    /// Annualization model.
    pub annualization: AnnualizationModel,
}

impl Default for PutEvaluatorConfig {
    fn default() -> Self {
        Self {
            min_annualized_roi: 15.0,
            roi_strategy: RoiStrategy::Simple,
            annualization: AnnualizationModel::Compounded,
        }
    }
}

/// Turns filtered put rows into ranked candidates.
pub struct PutEvaluator {
    config: PutEvaluatorConfig,
}

impl PutEvaluator {
    pub fn new(config: PutEvaluatorConfig) -> Self {
        Self { config }
    }

    /// Score `rows` from `chain`, best annualized ROI first.
    pub fn evaluate(&self, chain: &OptionChain, rows: &[QuotedRow<'_>], now: DateTime<Utc>) -> Evaluation {
        let today = market_today(now);
        let mut evaluation = Evaluation::default();

        for row in rows {
            let Some(expiry) = chain.expiry_groups.resolve_expiry(row.expiry_token(), today) else {
                debug!("{}: no expiry group for '{}'", chain.ticker, row.expiry_token());
                continue;
            };

            let days = match self.config.annualization {
                AnnualizationModel::Compounded => days_until(expiry.date, now),
                AnnualizationModel::Apy => raw_days_until(expiry.date, now),
            };

            let roi = self.config.roi_strategy.roi(row.bid, row.strike);
            let annualized_roi = match self
                .config
                .annualization
                .annualize(roi, row.bid, row.strike, days)
            {
                Ok(value) => value,
                Err(e) => {
                    evaluation.warnings.push(format!(
                        "{} {} put expiring {}: {}",
                        chain.ticker, row.strike, expiry.date, e
                    ));
                    continue;
                }
            };

            if annualized_roi < self.config.min_annualized_roi {
                continue;
            }

            evaluation.results.push(AnalysisResult {
                ticker: chain.ticker.clone(),
                current_price: chain.current_price,
                strike_price: row.strike,
                exp_date: expiry.date,
                exp_date_str: expiry.date.format("%Y-%m-%d").to_string(),
                expiry_group: expiry.label,
                days_to_expiration: days,
                bid: row.bid,
                percentage_from_strike: percentage_from_strike(row.strike, chain.current_price),
                roi,
                annualized_roi,
                spread: None,
            });
        }

        sort_by_annualized_roi(&mut evaluation.results);
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::chain_filter::filter_chain;
    use crate::data::{ChainLink, OptionSide};
    use crate::pricing::annualized_roi;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        // Noon Eastern, Jan 1 2025
        Utc.with_ymd_and_hms(2025, 1, 1, 17, 0, 0).unwrap()
    }

    fn put(strike: &str, bid: &str, token: &str, group: &str) -> ChainLink {
        ChainLink {
            strike: Some(strike.to_string()),
            put_bid: Some(bid.to_string()),
            call_bid: None,
            call_ask: None,
            expiry_date: token.to_string(),
            expiry_group: group.to_string(),
        }
    }

    fn sample_chain() -> OptionChain {
        OptionChain::new(
            "ABC",
            dec!(110),
            vec![
                put("100", "2.00", "Feb 25", "February 25, 2025 (Monthly)"),
                put("105", "4.50", "Feb 25", "February 25, 2025 (Monthly)"),
                put("95", "0.10", "Feb 25", "February 25, 2025 (Monthly)"),
                put("100", "3.00", "Apr 17", ""),
            ],
        )
    }

    fn evaluator(min: f64) -> PutEvaluator {
        PutEvaluator::new(PutEvaluatorConfig {
            min_annualized_roi: min,
            ..Default::default()
        })
    }

    #[test]
    fn test_worked_example() {
        let chain = sample_chain();
        let rows = filter_chain(&chain.links[..1], dec!(110), OptionSide::Put);
        let evaluation = evaluator(0.0).evaluate(&chain, &rows, now());

        assert_eq!(evaluation.len(), 1);
        let result = &evaluation.results[0];
        assert_eq!(result.ticker, "ABC");
        assert_eq!(result.exp_date_str, "2025-02-25");
        assert_eq!(result.expiry_group, "February 25, 2025 (Monthly)");
        assert_eq!(result.days_to_expiration, 55);
        assert!((result.percentage_from_strike - -9.0909).abs() < 0.001);
        assert_eq!(result.roi, 2.0);
        assert!((result.annualized_roi - annualized_roi(0.02, 57)).abs() < 1e-9);
        assert!(result.spread.is_none());
    }

    #[test]
    fn test_cutoff_is_a_hard_filter() {
        let chain = sample_chain();
        let rows = filter_chain(&chain.links, dec!(110), OptionSide::Put);
        let evaluation = evaluator(15.0).evaluate(&chain, &rows, now());

        // Only the 105 strike clears 15%; 100 is ~13.5%, 95 is far below.
        assert_eq!(evaluation.len(), 1);
        assert_eq!(evaluation.results[0].strike_price, dec!(105));
        assert!(evaluation.results.iter().all(|r| r.annualized_roi >= 15.0));
    }

    #[test]
    fn test_unresolved_expiry_excluded() {
        let chain = sample_chain();
        let rows = filter_chain(&chain.links, dec!(110), OptionSide::Put);
        let evaluation = evaluator(0.0).evaluate(&chain, &rows, now());

        // The "Apr 17" row has no group and is dropped.
        assert_eq!(evaluation.len(), 3);
        assert!(evaluation.results.iter().all(|r| r.exp_date_str == "2025-02-25"));
        assert!(evaluation.warnings.is_empty());
    }

    #[test]
    fn test_results_sorted_descending() {
        let chain = sample_chain();
        let rows = filter_chain(&chain.links, dec!(110), OptionSide::Put);
        let evaluation = evaluator(0.0).evaluate(&chain, &rows, now());

        let strikes: Vec<Decimal> = evaluation.results.iter().map(|r| r.strike_price).collect();
        assert_eq!(strikes, vec![dec!(105), dec!(100), dec!(95)]);
    }

    #[test]
    fn test_apy_model_reports_expired_rows() {
        let chain = OptionChain::new(
            "ABC",
            dec!(110),
            vec![
                put("100", "2.00", "Dec 20", "December 20, 2024"),
                put("100", "2.00", "Feb 25", "February 25, 2025"),
            ],
        );
        let rows = filter_chain(&chain.links, dec!(110), OptionSide::Put);
        let evaluation = PutEvaluator::new(PutEvaluatorConfig {
            min_annualized_roi: 0.0,
            annualization: AnnualizationModel::Apy,
            ..Default::default()
        })
        .evaluate(&chain, &rows, now());

        assert_eq!(evaluation.len(), 1);
        assert_eq!(evaluation.warnings.len(), 1);
        assert!(evaluation.warnings[0].contains("2024-12-20"));

        let result = &evaluation.results[0];
        assert_eq!(result.days_to_expiration, 55);
        assert!((result.annualized_roi - 2.0 / 55.0 * 365.0).abs() < 1e-9);
    }

    #[test]
    fn test_compounded_model_clamps_expired_rows() {
        let chain = OptionChain::new(
            "ABC",
            dec!(110),
            vec![put("100", "0.50", "Dec 20", "December 20, 2024")],
        );
        let rows = filter_chain(&chain.links, dec!(110), OptionSide::Put);
        let evaluation = evaluator(0.0).evaluate(&chain, &rows, now());

        assert_eq!(evaluation.len(), 1);
        assert_eq!(evaluation.results[0].days_to_expiration, 1);
        assert!((evaluation.results[0].annualized_roi - annualized_roi(0.005, 3)).abs() < 1e-9);
    }

    #[test]
    fn test_leveraged_strategy_changes_roi() {
        let chain = sample_chain();
        let rows = filter_chain(&chain.links[..1], dec!(110), OptionSide::Put);
        let evaluation = PutEvaluator::new(PutEvaluatorConfig {
            min_annualized_roi: 0.0,
            roi_strategy: RoiStrategy::leveraged_defaults(),
            ..Default::default()
        })
        .evaluate(&chain, &rows, now());

        assert!(evaluation.results[0].roi > 9.9);
    }
}
