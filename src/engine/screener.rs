//! Screening pipeline.
//!
//! Runs one chain through:
//! 1. Threshold resolution against the current price
//! 2. Chain filtering by strike and quote
//! 3. Put evaluation or call spread search
//! 4. Optional cherry picking
//! 5. Ranking by annualized ROI
//!
//! Chains are independent, so [`Screener::screen_all`] evaluates them in
//! parallel and folds the per-ticker results together.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::analytics::{filter_chain, pick_cherries, PutEvaluator, SpreadOptimizer};
use crate::config::ScreenerConfig;
use crate::data::{sort_by_annualized_roi, Evaluation, OptionChain, OptionSide, TickerRequest};

/// Screens option chains according to a [`ScreenerConfig`].
pub struct Screener {
    config: ScreenerConfig,
    puts: PutEvaluator,
    spreads: SpreadOptimizer,
}

impl Screener {
    pub fn new(config: ScreenerConfig) -> Self {
        let puts = PutEvaluator::new(config.put_evaluator_config());
        let spreads = SpreadOptimizer::new(config.spread_optimizer_config());
        Self { config, puts, spreads }
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Screen a single chain. `threshold` is the raw value from the ticker
    /// list.
    pub fn screen_chain(&self, chain: &OptionChain, threshold: Decimal, now: DateTime<Utc>) -> Evaluation {
        if chain.is_empty() {
            info!("{}: no chain rows", chain.ticker);
            return Evaluation::default();
        }
        if chain.current_price <= Decimal::ZERO {
            warn!("{}: no usable underlying price", chain.ticker);
            return Evaluation {
                results: Vec::new(),
                warnings: vec![format!("{}: missing underlying price", chain.ticker)],
            };
        }

        let Some(strike_limit) = self.config.threshold_mode.resolve(threshold, chain.current_price) else {
            warn!("{}: threshold {} out of range", chain.ticker, threshold);
            return Evaluation {
                results: Vec::new(),
                warnings: vec![format!(
                    "{}: threshold {} times price {} is out of range",
                    chain.ticker, threshold, chain.current_price
                )],
            };
        };
        let rows = filter_chain(&chain.links, strike_limit, self.config.side);

        let mut evaluation = match self.config.side {
            OptionSide::Put => self.puts.evaluate(chain, &rows, now),
            OptionSide::Call => Evaluation {
                results: self.spreads.optimize(chain, &rows, now),
                warnings: Vec::new(),
            },
        };

        if self.config.cherries_only {
            evaluation.results = pick_cherries(&evaluation.results, self.config.cherry_mode);
            sort_by_annualized_roi(&mut evaluation.results);
        }

        info!(
            "{}: {} candidates from {} rows (strike limit {})",
            chain.ticker,
            evaluation.len(),
            rows.len(),
            strike_limit.round_dp(2)
        );
        evaluation
    }

    /// Screen every (request, chain) pair and merge the results.
    ///
    /// Per-ticker order is preserved before the final stable sort, so ties
    /// keep ticker-list order.
    pub fn screen_all(&self, jobs: &[(TickerRequest, OptionChain)], now: DateTime<Utc>) -> Evaluation {
        let mut merged = jobs
            .par_iter()
            .fold(Evaluation::default, |acc, (request, chain)| {
                acc.merge(self.screen_chain(chain, request.threshold, now))
            })
            .reduce(Evaluation::default, Evaluation::merge);

        sort_by_annualized_roi(&mut merged.results);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::CherryMode;
    use crate::data::ChainLink;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 17, 0, 0).unwrap()
    }

    fn link(strike: &str, put_bid: &str, call_bid: &str, call_ask: &str) -> ChainLink {
        ChainLink {
            strike: Some(strike.to_string()),
            put_bid: Some(put_bid.to_string()),
            call_bid: Some(call_bid.to_string()),
            call_ask: Some(call_ask.to_string()),
            expiry_date: "Feb 21".to_string(),
            expiry_group: "February 21, 2025".to_string(),
        }
    }

    fn chain(ticker: &str) -> OptionChain {
        OptionChain::new(
            ticker,
            dec!(100),
            vec![
                link("85", "0.60", "--", "--"),
                link("90", "2.00", "--", "--"),
                link("95", "2.50", "6.10", "6.30"),
                link("105", "--", "2.40", "2.50"),
                link("107", "--", "1.60", "1.70"),
                link("110", "--", "0.90", "1.00"),
                link("120", "--", "0.15", "0.20"),
            ],
        )
    }

    fn request(symbol: &str, threshold: Decimal) -> TickerRequest {
        TickerRequest {
            symbol: symbol.to_string(),
            threshold,
        }
    }

    #[test]
    fn test_put_pipeline() {
        let screener = Screener::new(ScreenerConfig::default());
        let evaluation = screener.screen_chain(&chain("ABC"), dec!(0.97), now());

        // Strike limit 97: 85, 90 and 95 are candidates; 85 falls short of 15%.
        let strikes: Vec<Decimal> = evaluation.results.iter().map(|r| r.strike_price).collect();
        assert_eq!(strikes, vec![dec!(95), dec!(90)]);
        assert!(evaluation.results.iter().all(|r| r.annualized_roi >= 15.0));
    }

    #[test]
    fn test_call_pipeline() {
        let screener = Screener::new(ScreenerConfig {
            side: OptionSide::Call,
            ..Default::default()
        });
        let evaluation = screener.screen_chain(&chain("ABC"), dec!(1.03), now());

        assert!(!evaluation.is_empty());
        for result in &evaluation.results {
            assert!(result.strike_price > dec!(103));
            let details = result.spread.as_ref().unwrap();
            assert!(details.long_strike > result.strike_price);
            assert!(details.net_credit > Decimal::ZERO);
            assert!(details.max_risk > Decimal::ZERO);
        }
    }

    #[test]
    fn test_cherries_only() {
        let screener = Screener::new(ScreenerConfig {
            min_annualized_roi: 0.0,
            cherries_only: true,
            cherry_mode: CherryMode::Grouped,
            ..Default::default()
        });
        let evaluation = screener.screen_chain(&chain("ABC"), dec!(0.97), now());

        // 90 beats 85 and 95 beats 90; 85 opens the group.
        let strikes: Vec<Decimal> = evaluation.results.iter().map(|r| r.strike_price).collect();
        assert_eq!(strikes, vec![dec!(95), dec!(90)]);
    }

    #[test]
    fn test_empty_and_priceless_chains() {
        let screener = Screener::new(ScreenerConfig::default());

        let empty = screener.screen_chain(&OptionChain::empty("ABC"), dec!(0.9), now());
        assert!(empty.is_empty());
        assert!(empty.warnings.is_empty());

        let mut priceless = chain("ABC");
        priceless.current_price = Decimal::ZERO;
        let evaluation = screener.screen_chain(&priceless, dec!(0.9), now());
        assert!(evaluation.is_empty());
        assert_eq!(evaluation.warnings.len(), 1);
    }

    #[test]
    fn test_out_of_range_values_stay_per_ticker() {
        let screener = Screener::new(ScreenerConfig {
            side: OptionSide::Call,
            ..Default::default()
        });

        let mut huge = chain("HUGE");
        huge.links.push(link("79,228,162,514,264,337,593,543,950,335", "--", "1.00", "0.50"));

        let jobs = vec![
            (request("AAA", dec!(1.03)), chain("AAA")),
            (request("HUGE", dec!(1.03)), huge),
            (request("BIG", Decimal::MAX), chain("BIG")),
        ];
        let evaluation = screener.screen_all(&jobs, now());

        assert!(evaluation.results.iter().any(|r| r.ticker == "AAA"));
        assert!(evaluation.results.iter().any(|r| r.ticker == "HUGE"));
        assert!(evaluation.results.iter().all(|r| r.ticker != "BIG"));
        assert_eq!(evaluation.warnings.len(), 1);
        assert!(evaluation.warnings[0].starts_with("BIG:"));
    }

    #[test]
    fn test_screen_all_merges_and_ranks() {
        let screener = Screener::new(ScreenerConfig::default());
        let jobs = vec![
            (request("AAA", dec!(0.97)), chain("AAA")),
            (request("BBB", dec!(0.97)), OptionChain::empty("BBB")),
            (request("CCC", dec!(0.92)), chain("CCC")),
        ];
        let evaluation = screener.screen_all(&jobs, now());

        assert_eq!(evaluation.len(), 3);
        for pair in evaluation.results.windows(2) {
            assert!(pair[0].annualized_roi >= pair[1].annualized_roi);
        }

        // Equal scores keep ticker-list order.
        let tickers: Vec<&str> = evaluation.results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["AAA", "AAA", "CCC"]);
        assert!(evaluation.results[1].annualized_roi == evaluation.results[2].annualized_roi);
    }
}
