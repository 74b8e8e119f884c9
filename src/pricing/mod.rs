//! Pricing math.
//!
//! Provides:
//! - Percentage-from-strike, simple and leveraged ROI
//! - Compounded annualized ROI and linear APY
//! - Commission model used by the leveraged strategy

pub mod commission;
pub mod math;
pub mod strategy;

pub use commission::CommissionModel;
pub use math::{
    annualized_roi, apy, leveraged_roi, percentage_from_strike, roi, PricingError, SETTLEMENT_DAYS,
};
pub use strategy::{AnnualizationModel, CommissionBasis, RoiStrategy};
