//! Screener configuration.
//!
//! Loaded from TOML; every field has a default so a file only needs the
//! values it changes.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{default_spread_widths, CherryMode, PutEvaluatorConfig, SpreadOptimizerConfig};
use crate::data::OptionSide;
use crate::pricing::{AnnualizationModel, RoiStrategy};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How a ticker's threshold becomes a strike price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Always `threshold * current price`, whatever the magnitude.
    #[default]
    PriceMultiplier,
    /// Below 1.0 a fraction of the current price, otherwise a dollar strike.
    AbsoluteAboveOne,
}

impl ThresholdMode {
    /// Strike limit for `threshold`, or `None` when the product leaves
    /// `Decimal`'s range.
    pub fn resolve(&self, threshold: Decimal, current_price: Decimal) -> Option<Decimal> {
        match self {
            Self::AbsoluteAboveOne if threshold >= Decimal::ONE => Some(threshold),
            _ => threshold.checked_mul(current_price),
        }
    }
}

/// Configuration for a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Puts are scored as cash-secured sales, calls as credit spreads.
    pub side: OptionSide,

    /// Minimum annualized ROI in percent.
    pub min_annualized_roi: f64,

    /// ROI formula for puts.
    pub roi_strategy: RoiStrategy,

    /// Annualization model for puts. Spreads always compound.
    pub annualization: AnnualizationModel,

    /// Spread widths to search, as fractions of the short strike.
    pub spread_widths: Vec<Decimal>,

    /// Long-leg price multiplier on the bid when no ask is quoted.
    pub ask_fallback_multiplier: Decimal,

    /// Report only cherries.
    pub cherries_only: bool,

    /// Neighbour rule for cherry picking.
    pub cherry_mode: CherryMode,

    /// Interpretation of ticker thresholds.
    pub threshold_mode: ThresholdMode,

    /// Furthest expiry requested from the quote provider, in days from today.
    pub max_expiry_days: i64,

    /// Minimum delay between provider requests, in milliseconds.
    pub request_interval_ms: u64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            side: OptionSide::Put,
            min_annualized_roi: 15.0,
            roi_strategy: RoiStrategy::Simple,
            annualization: AnnualizationModel::Compounded,
            spread_widths: default_spread_widths(),
            ask_fallback_multiplier: Decimal::new(11, 1),
            cherries_only: false,
            cherry_mode: CherryMode::Grouped,
            threshold_mode: ThresholdMode::PriceMultiplier,
            max_expiry_days: 60,
            request_interval_ms: 250,
        }
    }
}

impl ScreenerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_annualized_roi.is_finite() {
            return Err(ConfigError::Invalid("min_annualized_roi must be finite".to_string()));
        }
        if self.spread_widths.is_empty() {
            return Err(ConfigError::Invalid("spread_widths must not be empty".to_string()));
        }
        if let Some(width) = self.spread_widths.iter().find(|w| **w <= Decimal::ZERO) {
            return Err(ConfigError::Invalid(format!("spread width {} must be positive", width)));
        }
        if self.ask_fallback_multiplier <= Decimal::ZERO {
            return Err(ConfigError::Invalid("ask_fallback_multiplier must be positive".to_string()));
        }
        if self.max_expiry_days <= 0 {
            return Err(ConfigError::Invalid("max_expiry_days must be positive".to_string()));
        }
        if let RoiStrategy::Leveraged { leverage, .. } = self.roi_strategy {
            if !(leverage.is_finite() && leverage > 0.0) {
                return Err(ConfigError::Invalid("leverage must be positive".to_string()));
            }
        }
        Ok(())
    }

    pub fn put_evaluator_config(&self) -> PutEvaluatorConfig {
        PutEvaluatorConfig {
            min_annualized_roi: self.min_annualized_roi,
            roi_strategy: self.roi_strategy.clone(),
            annualization: self.annualization,
        }
    }

    pub fn spread_optimizer_config(&self) -> SpreadOptimizerConfig {
        SpreadOptimizerConfig {
            spread_widths: self.spread_widths.clone(),
            min_annualized_roi: self.min_annualized_roi,
            ask_fallback_multiplier: self.ask_fallback_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{CommissionBasis, CommissionModel};
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = ScreenerConfig::default();
        assert_eq!(config.side, OptionSide::Put);
        assert_eq!(config.min_annualized_roi, 15.0);
        assert_eq!(config.spread_widths.len(), 8);
        assert_eq!(config.ask_fallback_multiplier, dec!(1.1));
        assert_eq!(config.cherry_mode, CherryMode::Grouped);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_modes() {
        let price = dec!(200);

        assert_eq!(ThresholdMode::PriceMultiplier.resolve(dec!(0.9), price), Some(dec!(180)));
        assert_eq!(ThresholdMode::PriceMultiplier.resolve(dec!(1.1), price), Some(dec!(220)));

        assert_eq!(ThresholdMode::AbsoluteAboveOne.resolve(dec!(0.9), price), Some(dec!(180)));
        assert_eq!(ThresholdMode::AbsoluteAboveOne.resolve(dec!(150), price), Some(dec!(150)));
        assert_eq!(ThresholdMode::AbsoluteAboveOne.resolve(dec!(1), price), Some(dec!(1)));
    }

    #[test]
    fn test_threshold_overflow() {
        assert_eq!(ThresholdMode::PriceMultiplier.resolve(Decimal::MAX, dec!(200)), None);
        assert_eq!(
            ThresholdMode::AbsoluteAboveOne.resolve(Decimal::MAX, dec!(200)),
            Some(Decimal::MAX)
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = ScreenerConfig::from_toml_str(
            r#"
            side = "call"
            min_annualized_roi = 20.0
            spread_widths = ["0.05", "0.10"]
            cherries_only = true
            cherry_mode = "sequential"
            threshold_mode = "absolute_above_one"

            [roi_strategy]
            kind = "leveraged"
            leverage = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.side, OptionSide::Call);
        assert_eq!(config.min_annualized_roi, 20.0);
        assert_eq!(config.spread_widths, vec![dec!(0.05), dec!(0.10)]);
        assert!(config.cherries_only);
        assert_eq!(config.cherry_mode, CherryMode::Sequential);
        assert_eq!(config.threshold_mode, ThresholdMode::AbsoluteAboveOne);
        assert_eq!(
            config.roi_strategy,
            RoiStrategy::Leveraged {
                leverage: 0.5,
                commission: CommissionModel::default(),
                commission_basis: CommissionBasis::PerShare,
            }
        );
        assert_eq!(config.max_expiry_days, 60);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ScreenerConfig::from_toml_str("spread_widths = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ScreenerConfig::from_toml_str("max_expiry_days = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ScreenerConfig::from_toml_str("side = \"straddle\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_component_configs() {
        let config = ScreenerConfig {
            min_annualized_roi: 30.0,
            annualization: AnnualizationModel::Apy,
            ..Default::default()
        };

        let puts = config.put_evaluator_config();
        assert_eq!(puts.min_annualized_roi, 30.0);
        assert_eq!(puts.annualization, AnnualizationModel::Apy);

        let spreads = config.spread_optimizer_config();
        assert_eq!(spreads.min_annualized_roi, 30.0);
        assert_eq!(spreads.spread_widths, default_spread_widths());
    }
}
