use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::fixed_income::terms::ClientType;
use crate::types::Rate;

/// Withholding applied to coupons and proceeds, fixed per client type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicy {
    /// Withheld from every coupon received.
    pub coupon_tax: Rate,
    /// Withheld from sale proceeds.
    pub txn_tax: Rate,
}

impl TaxPolicy {
    pub const INDIVIDUAL: TaxPolicy = TaxPolicy {
        coupon_tax: dec!(0.05),
        txn_tax: dec!(0.001),
    };

    pub const CORPORATION: TaxPolicy = TaxPolicy {
        coupon_tax: Decimal::ZERO,
        txn_tax: Decimal::ZERO,
    };

    pub fn for_client(client_type: ClientType) -> TaxPolicy {
        match client_type {
            ClientType::Individual => Self::INDIVIDUAL,
            ClientType::Corporation => Self::CORPORATION,
        }
    }

    /// Every client type with its policy, in table order.
    pub fn table() -> [(ClientType, TaxPolicy); 2] {
        [
            (ClientType::Individual, Self::INDIVIDUAL),
            (ClientType::Corporation, Self::CORPORATION),
        ]
    }

    /// Fraction of a coupon the holder keeps.
    pub fn coupon_net(&self) -> Decimal {
        Decimal::ONE - self.coupon_tax
    }
}
