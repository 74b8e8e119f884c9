//! Return formulas.
//!
//! Prices stay in `Decimal`; ratios and percentages are `f64` since
//! annualizing needs a fractional power.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Settlement days added to days-to-expiration before annualizing; collateral
/// is not released until the contract settles.
pub const SETTLEMENT_DAYS: i64 = 2;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("APY needs a positive day count, got {0}")]
    NonPositiveDays(i64),
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// `num / den`, 0 for a zero denominator. Quotients beyond `Decimal`'s range
/// are computed in `f64` instead of panicking.
fn ratio(num: Decimal, den: Decimal) -> f64 {
    if den.is_zero() {
        return 0.0;
    }
    match num.checked_div(den) {
        Some(q) => to_f64(q),
        None => to_f64(num) / to_f64(den),
    }
}

/// Signed distance of the strike from the current price, in percent.
pub fn percentage_from_strike(strike: Decimal, current: Decimal) -> f64 {
    ratio(strike - current, current) * 100.0
}

/// Single-period return on the strike, in percent.
pub fn roi(premium: Decimal, strike: Decimal) -> f64 {
    ratio(premium, strike) * 100.0
}

/// Single-period return on a leveraged position, in percent.
///
/// Cost is `target_price * leverage + commission`, everything per share.
pub fn leveraged_roi(premium: Decimal, target_price: Decimal, leverage: f64, commission: Decimal) -> f64 {
    let cost = to_f64(target_price) * leverage + to_f64(commission);
    if cost <= 0.0 {
        return 0.0;
    }
    to_f64(premium) / cost * 100.0
}

/// Compound a single-period return to a 365-day year, in percent.
///
/// `roi_decimal` is a fraction (0.02 = 2%). Horizons below one day are
/// treated as one day.
pub fn annualized_roi(roi_decimal: f64, horizon_days: i64) -> f64 {
    let days = horizon_days.max(1) as f64;
    ((1.0 + roi_decimal).powf(DAYS_PER_YEAR / days) - 1.0) * 100.0
}

/// Linear annual yield, in percent.
pub fn apy(strike: Decimal, premium: Decimal, days: i64) -> Result<f64, PricingError> {
    if days <= 0 {
        return Err(PricingError::NonPositiveDays(days));
    }
    Ok(ratio(premium, strike) / days as f64 * DAYS_PER_YEAR * 100.0)
}
