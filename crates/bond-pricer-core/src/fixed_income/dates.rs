//! Calendar helpers shared by the schedule generator and request parsing.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::PricerError;
use crate::PricerResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string, naming the offending field on failure.
pub fn parse_date(field: &str, value: &str) -> PricerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| PricerError::DateFormat {
        field: field.into(),
        value: value.into(),
    })
}

/// Add whole months to a date, clamping the day to the target month's end.
pub fn add_months(date: NaiveDate, months: u32) -> PricerResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| PricerError::InvalidInput {
            field: "maturity_date".into(),
            reason: format!("{months} months after {date} is outside the supported calendar"),
        })
}

/// Whole months from `start` to `end`, rounded up when `end` falls after the
/// same day-of-month. Zero when `end` is not after `start`.
pub fn months_between_ceil(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let months = ((end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32)
        .max(0) as u32;
    match start.checked_add_months(Months::new(months)) {
        Some(stepped) if stepped >= end => months,
        _ => months + 1,
    }
}

/// Ex-coupon date: `offset_days` calendar days before the payment date.
pub fn ex_coupon_date(payment: NaiveDate, offset_days: u32) -> PricerResult<NaiveDate> {
    payment
        .checked_sub_days(Days::new(offset_days as u64))
        .ok_or_else(|| PricerError::InvalidInput {
            field: "conventions.ex_coupon_offset_days".into(),
            reason: format!("Offset of {offset_days} days underflows {payment}"),
        })
}
