//! Broker commission, expressed per share so it can be netted against
//! premiums and strikes.
//!
//! Default: $0.65 per contract per leg, 100 shares per contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionModel {
    /// Charge per contract per leg.
    pub per_contract: Decimal,
    /// Floor applied to each order.
    pub min_per_order: Decimal,
    /// Shares delivered per contract.
    pub contract_size: u32,
}

impl Default for CommissionModel {
    fn default() -> Self {
        Self {
            per_contract: Decimal::new(65, 2),
            min_per_order: Decimal::ZERO,
            contract_size: 100,
        }
    }
}

impl CommissionModel {
    pub fn new(per_contract: Decimal) -> Self {
        Self {
            per_contract,
            ..Default::default()
        }
    }

    /// Commission-free broker.
    pub fn zero() -> Self {
        Self::new(Decimal::ZERO)
    }

    /// Dollar cost of one order.
    pub fn order_cost(&self, contracts: u32, legs: u32) -> Decimal {
        let charged = self.per_contract * Decimal::from(contracts) * Decimal::from(legs);
        charged.max(self.min_per_order)
    }

    /// Cost of selling a single contract, spread over its shares.
    pub fn per_share(&self) -> Decimal {
        if self.contract_size == 0 {
            return Decimal::ZERO;
        }
        self.order_cost(1, 1) / Decimal::from(self.contract_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let model = CommissionModel::default();
        assert_eq!(model.per_contract, dec!(0.65));
        assert_eq!(model.contract_size, 100);
        assert_eq!(model.per_share(), dec!(0.0065));
    }

    #[test]
    fn test_order_cost_scales_with_contracts_and_legs() {
        let model = CommissionModel::new(dec!(1));
        assert_eq!(model.order_cost(10, 2), dec!(20));
        assert_eq!(model.order_cost(5, 1), dec!(5));
        assert_eq!(CommissionModel::zero().order_cost(100, 4), dec!(0));
    }

    #[test]
    fn test_minimum_applies() {
        let model = CommissionModel {
            min_per_order: dec!(1.50),
            ..Default::default()
        };
        assert_eq!(model.order_cost(1, 1), dec!(1.50));
        assert_eq!(model.order_cost(4, 1), dec!(2.60));
        assert_eq!(model.per_share(), dec!(0.015));
    }

    #[test]
    fn test_zero_contract_size() {
        let model = CommissionModel {
            contract_size: 0,
            ..Default::default()
        };
        assert_eq!(model.per_share(), Decimal::ZERO);
    }
}
