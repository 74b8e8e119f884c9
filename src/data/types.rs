//! Core data types for options screening.
//!
//! Chain rows are kept the way the exchange publishes them: every price is a
//! string, the expiry is a terse "MMM D" token and the full expiry-group label
//! travels alongside. Numbers are parsed at the filter boundary so a bad row
//! can be dropped without failing the whole chain.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expiry::ExpiryGroups;

/// Marker the exchange prints in place of a missing quote.
pub const NO_QUOTE: &str = "--";

/// Option side (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    #[default]
    Put,
}

impl OptionSide {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" | "CALL" | "CALLS" => Some(Self::Call),
            "P" | "PUT" | "PUTS" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

/// Parse an exchange price string.
///
/// Accepts thousands separators and a leading `$`. Returns `None` for the
/// no-quote marker, empty strings, negative values and anything else that is
/// not a number.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_QUOTE {
        return None;
    }
    let cleaned: String = trimmed
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let value = Decimal::from_str(&cleaned).ok()?;
    if value.is_sign_negative() {
        return None;
    }
    Some(value)
}

/// A single raw row of an options chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLink {
    /// Strike price as published, e.g. "1,250.00".
    pub strike: Option<String>,

    /// Put bid.
    pub put_bid: Option<String>,

    /// Call bid.
    pub call_bid: Option<String>,

    /// Call ask.
    pub call_ask: Option<String>,

    /// Terse expiry token, e.g. "Feb 25".
    pub expiry_date: String,

    /// Expiry-group label the row was listed under, e.g. "February 25, 2025".
    pub expiry_group: String,
}

impl ChainLink {
    /// Parsed strike price.
    pub fn strike_price(&self) -> Option<Decimal> {
        self.strike.as_deref().and_then(parse_price)
    }

    /// Parsed bid for the given side.
    pub fn bid(&self, side: OptionSide) -> Option<Decimal> {
        match side {
            OptionSide::Put => self.put_bid.as_deref().and_then(parse_price),
            OptionSide::Call => self.call_bid.as_deref().and_then(parse_price),
        }
    }

    /// Parsed call ask.
    pub fn call_ask_price(&self) -> Option<Decimal> {
        self.call_ask.as_deref().and_then(parse_price)
    }

    #[cfg(test)]
    pub fn mock(strike: &str, bid: &str, expiry_date: &str) -> Self {
        ChainLink {
            strike: Some(strike.to_string()),
            put_bid: Some(bid.to_string()),
            call_bid: Some(bid.to_string()),
            call_ask: None,
            expiry_date: expiry_date.to_string(),
            expiry_group: String::new(),
        }
    }
}

/// Complete chain for one underlying as returned by a quote provider.
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    /// Underlying symbol
    pub ticker: String,

    /// Last traded price of the underlying
    pub current_price: Decimal,

    /// Raw chain rows
    pub links: Vec<ChainLink>,

    /// Distinct expiry-group labels seen across the chain
    pub expiry_groups: ExpiryGroups,
}

impl OptionChain {
    /// Build a chain, deriving expiry groups from the rows.
    pub fn new(ticker: &str, current_price: Decimal, links: Vec<ChainLink>) -> Self {
        let expiry_groups = ExpiryGroups::from_labels(links.iter().map(|l| l.expiry_group.as_str()));
        Self {
            ticker: ticker.to_string(),
            current_price,
            links,
            expiry_groups,
        }
    }

    /// Chain with no rows, used when a provider fails.
    pub fn empty(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Extra fields carried by a call credit spread candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadDetails {
    /// Target width as a fraction of the short strike (0.05 = 5%).
    pub width: f64,
    /// Strike of the purchased leg.
    pub long_strike: Decimal,
    /// Price paid for the long leg (ask, or bid fallback).
    pub long_price: Decimal,
    /// Short bid minus long price.
    pub net_credit: Decimal,
    /// Strike difference minus net credit.
    pub max_risk: Decimal,
}

impl SpreadDetails {
    pub fn width_pct(&self) -> f64 {
        self.width * 100.0
    }
}

/// A scored trade candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ticker: String,
    pub current_price: Decimal,
    /// Strike of the sold option (short leg for spreads).
    pub strike_price: Decimal,
    pub exp_date: NaiveDate,
    /// `exp_date` as `YYYY-MM-DD`; sorts chronologically.
    pub exp_date_str: String,
    /// Expiry-group label the row resolved to.
    pub expiry_group: String,
    pub days_to_expiration: i64,
    /// Premium received: the bid for puts, net credit for spreads.
    pub bid: Decimal,
    pub percentage_from_strike: f64,
    pub roi: f64,
    pub annualized_roi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<SpreadDetails>,
}

/// Output of an evaluation pass: candidates plus non-fatal problems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    pub results: Vec<AnalysisResult>,
    pub warnings: Vec<String>,
}

impl Evaluation {
    pub fn merge(mut self, other: Evaluation) -> Evaluation {
        self.results.extend(other.results);
        self.warnings.extend(other.warnings);
        self
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Stable sort, highest annualized ROI first. Ties keep input order.
pub fn sort_by_annualized_roi(results: &mut [AnalysisResult]) {
    results.sort_by(|a, b| {
        b.annualized_roi
            .partial_cmp(&a.annualized_roi)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
pub(crate) fn mock_result(exp: &str, strike: i64, bid: Decimal, pct: f64, annual: f64) -> AnalysisResult {
    let exp_date = NaiveDate::parse_from_str(exp, "%Y-%m-%d").unwrap();
    AnalysisResult {
        ticker: "ABC".to_string(),
        current_price: Decimal::from(100),
        strike_price: Decimal::from(strike),
        exp_date,
        exp_date_str: exp.to_string(),
        expiry_group: String::new(),
        days_to_expiration: 30,
        bid,
        percentage_from_strike: pct,
        roi: 1.0,
        annualized_roi: annual,
        spread: None,
    }
}
