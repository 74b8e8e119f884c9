//! Selectable return strategies.
//!
//! The simple and leveraged ROI formulas give different numbers for the same
//! row; callers pick one explicitly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::commission::CommissionModel;
use super::math::{annualized_roi, apy, leveraged_roi, roi, PricingError, SETTLEMENT_DAYS};

fn default_leverage() -> f64 {
    0.2
}

/// Units the leveraged cost adds commission in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommissionBasis {
    /// One contract's commission divided by the contract size, matching the
    /// per-share scale of strikes and premiums ($0.65 becomes 0.0065).
    #[default]
    PerShare,
    /// One contract's commission added as is ($0.65 stays 0.65).
    PerContract,
}

impl CommissionBasis {
    fn amount(&self, commission: &CommissionModel) -> Decimal {
        match self {
            Self::PerShare => commission.per_share(),
            Self::PerContract => commission.order_cost(1, 1),
        }
    }
}

/// How the single-period ROI of a sold option is measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoiStrategy {
    /// Premium over strike.
    #[default]
    Simple,
    /// Premium over `strike * leverage + commission`, with the commission
    /// in the units chosen by `commission_basis`.
    Leveraged {
        #[serde(default = "default_leverage")]
        leverage: f64,
        #[serde(default)]
        commission: CommissionModel,
        #[serde(default)]
        commission_basis: CommissionBasis,
    },
}

impl RoiStrategy {
    /// Leveraged strategy with 20% margin and the default per-share commission.
    pub fn leveraged_defaults() -> Self {
        Self::Leveraged {
            leverage: default_leverage(),
            commission: CommissionModel::default(),
            commission_basis: CommissionBasis::PerShare,
        }
    }

    /// ROI in percent.
    pub fn roi(&self, premium: Decimal, strike: Decimal) -> f64 {
        match self {
            Self::Simple => roi(premium, strike),
            Self::Leveraged {
                leverage,
                commission,
                commission_basis,
            } => leveraged_roi(premium, strike, *leverage, commission_basis.amount(commission)),
        }
    }
}

/// How a single-period return is scaled to a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnnualizationModel {
    /// Compound over the clamped day count plus settlement days.
    #[default]
    Compounded,
    /// Linear APY over the unclamped day count; fails for non-positive days.
    Apy,
}

impl AnnualizationModel {
    /// Annualized return in percent.
    ///
    /// `days` is clamped for [`Self::Compounded`] by the caller and raw for
    /// [`Self::Apy`].
    pub fn annualize(
        &self,
        roi_pct: f64,
        premium: Decimal,
        strike: Decimal,
        days: i64,
    ) -> Result<f64, PricingError> {
        match self {
            Self::Compounded => Ok(annualized_roi(roi_pct / 100.0, days + SETTLEMENT_DAYS)),
            Self::Apy => apy(strike, premium, days),
        }
    }
}
