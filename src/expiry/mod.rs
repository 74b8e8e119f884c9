//! Expiry handling.
//!
//! Provides:
//! - Resolution of terse "MMM D" tokens against a chain's expiry groups
//! - Year inference for chains that span a year boundary
//! - Day counts on the US Eastern exchange calendar

pub mod calendar;
pub mod groups;

pub use calendar::{days_until, market_today, raw_days_until, MARKET_TZ};
pub use groups::{infer_year, label_date, parse_token, ExpiryGroups, ResolvedExpiry};
