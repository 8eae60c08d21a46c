use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::PricerError;
use crate::types::{Money, Rate, Years};
use crate::PricerResult;

/// ACT/basis year fraction between two dates. Negative when `to` precedes `from`.
pub fn year_fraction(from: NaiveDate, to: NaiveDate, basis: Decimal) -> Years {
    Decimal::from((to - from).num_days()) / basis
}

/// Discount factor 1 / (1 + rate)^years with annual compounding.
///
/// Negative year fractions compound forward instead of discounting, which is
/// how cashflows dated before the valuation date are carried.
pub fn discount_factor(rate: Rate, years: Years) -> PricerResult<Decimal> {
    if rate <= dec!(-1) {
        return Err(PricerError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    if years.is_zero() {
        return Ok(Decimal::ONE);
    }

    let growth = (Decimal::ONE + rate)
        .checked_powd(years.abs())
        .ok_or_else(|| PricerError::InvalidInput {
            field: "discount_rate".into(),
            reason: format!("Compounding at {rate} over {years} years overflows"),
        })?;
    if growth.is_zero() {
        return Err(PricerError::DivisionByZero {
            context: "discount factor".into(),
        });
    }

    if years.is_sign_negative() {
        Ok(growth)
    } else {
        Ok(Decimal::ONE / growth)
    }
}

/// Present value of a single dated amount.
pub fn present_value(amount: Money, rate: Rate, years: Years) -> PricerResult<Money> {
    amount
        .checked_mul(discount_factor(rate, years)?)
        .ok_or_else(|| PricerError::InvalidInput {
            field: "discount_rate".into(),
            reason: format!("Present value of {amount} over {years} years overflows"),
        })
}
