//! Market conventions applied by the schedule generator and pricing engine.
//!
//! Every field has a default, so a request may omit the whole block or any
//! part of it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricerError;
use crate::PricerResult;

const DEFAULT_EX_COUPON_OFFSET_DAYS: u32 = 10;
const DEFAULT_DAY_COUNT_BASIS: u32 = 365;
const DEFAULT_AMOUNT_DP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConventions {
    /// Calendar days between the ex-coupon date and the payment date.
    pub ex_coupon_offset_days: u32,
    /// Denominator of every year fraction (ACT/basis).
    pub day_count_basis: u32,
    /// Decimal places kept on cashflows and reported amounts.
    pub amount_dp: u32,
}

impl Default for PricingConventions {
    fn default() -> Self {
        Self {
            ex_coupon_offset_days: DEFAULT_EX_COUPON_OFFSET_DAYS,
            day_count_basis: DEFAULT_DAY_COUNT_BASIS,
            amount_dp: DEFAULT_AMOUNT_DP,
        }
    }
}

impl PricingConventions {
    pub fn validate(&self) -> PricerResult<()> {
        if self.day_count_basis == 0 {
            return Err(PricerError::InvalidInput {
                field: "conventions.day_count_basis".into(),
                reason: "Day count basis must be positive".into(),
            });
        }
        if self.amount_dp > 12 {
            return Err(PricerError::InvalidInput {
                field: "conventions.amount_dp".into(),
                reason: "At most 12 decimal places are supported".into(),
            });
        }
        Ok(())
    }

    pub fn basis(&self) -> Decimal {
        Decimal::from(self.day_count_basis)
    }

    /// Round a reported amount to the configured number of places.
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp(self.amount_dp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_match_market_practice() {
        let c = PricingConventions::default();
        assert_eq!(c.ex_coupon_offset_days, 10);
        assert_eq!(c.day_count_basis, 365);
        assert_eq!(c.amount_dp, 4);
    }

    #[test]
    fn test_partial_block_keeps_other_defaults() {
        let c: PricingConventions = serde_json::from_str(r#"{"day_count_basis": 360}"#).unwrap();
        assert_eq!(c.day_count_basis, 360);
        assert_eq!(c.ex_coupon_offset_days, 10);
    }

    #[test]
    fn test_zero_basis_rejected() {
        let c = PricingConventions {
            day_count_basis: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_round_is_bankers() {
        let c = PricingConventions::default();
        assert_eq!(c.round(dec!(1.00005)), dec!(1.0000));
        assert_eq!(c.round(dec!(1.00015)), dec!(1.0002));
    }
}
