//! Coupon schedule generation.
//!
//! Coupon dates step forward from the issue date in whole-month increments
//! of `12 / frequency`. The number of periods is either given by the caller
//! or derived as the smallest count whose stepped date reaches maturity; in
//! both cases the final period is pinned to the maturity date, so a short
//! (or long) stub always ends exactly on maturity and carries the principal.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::conventions::PricingConventions;
use crate::fixed_income::dates::{add_months, ex_coupon_date, months_between_ceil};
use crate::fixed_income::terms::{BondTerms, BondType, PricingRequest};
use crate::time_value::year_fraction;
use crate::types::{with_metadata, ComputationOutput, Money, Years};
use crate::PricerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single scheduled payment. The final event includes principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponEvent {
    pub date: NaiveDate,
    pub ex_date: NaiveDate,
    /// Coupon rate for the period, e.g. "10.5%". Empty for zero-coupon bonds.
    pub rate_label: String,
    pub amount: Money,
}

/// Schedule row with the accrual figures behind its amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    #[serde(flatten)]
    pub event: CouponEvent,
    pub accrual_days: i64,
    pub year_fraction: Years,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub bond_type: BondType,
    pub months_per_period: u32,
    pub num_events: usize,
    pub rows: Vec<ScheduleRow>,
    /// Sum of all amounts, principal excluded.
    pub total_coupon: Money,
    pub principal: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the ordered coupon schedule for a bond.
pub fn build_schedule(
    bond: &BondTerms,
    conventions: &PricingConventions,
) -> PricerResult<Vec<CouponEvent>> {
    let periods = period_count(bond);
    if periods == 0 {
        return Ok(vec![CouponEvent {
            date: bond.maturity_date,
            ex_date: ex_coupon_date(bond.maturity_date, conventions.ex_coupon_offset_days)?,
            rate_label: String::new(),
            amount: conventions.round(bond.face_value),
        }]);
    }

    let step = bond.months_per_period();
    let basis = conventions.basis();
    let mut events = Vec::new();
    let mut previous = bond.issue_date;

    for i in 0..periods {
        let stepped = add_months(bond.issue_date, step.saturating_mul(i + 1))?;
        let is_last = i + 1 == periods || stepped >= bond.maturity_date;
        let date = if is_last { bond.maturity_date } else { stepped };

        let rate = bond.period_rate(i as usize);
        let yf = year_fraction(previous, date, basis);
        let mut amount = bond.face_value * rate / dec!(100) * yf;
        if is_last {
            amount += bond.face_value;
        }

        events.push(CouponEvent {
            date,
            ex_date: ex_coupon_date(date, conventions.ex_coupon_offset_days)?,
            rate_label: rate_label(rate),
            amount: conventions.round(amount),
        });

        previous = date;
        if is_last {
            break;
        }
    }

    tracing::debug!(
        periods = events.len(),
        step_months = step,
        "coupon schedule built"
    );
    Ok(events)
}

/// Resolve a request and return its schedule with accrual detail.
pub fn generate_schedule(
    request: &PricingRequest,
) -> PricerResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let resolved = request.resolve()?;
    let mut warnings = resolved.warnings;
    let bond = &resolved.bond;
    let conventions = &resolved.conventions;

    if bond.bond_type == BondType::Fixed && bond.num_periods == Some(0) {
        warnings.push("num_periods is 0: bond is scheduled as a single maturity payment".into());
    } else if bond.bond_type == BondType::Fixed && !bond.has_coupon() {
        warnings.push("no coupon rate supplied: bond is scheduled as a single maturity payment".into());
    }

    let events = build_schedule(bond, conventions)?;
    let rows = accrual_rows(bond.issue_date, &events, conventions);

    let gross: Money = events.iter().map(|e| e.amount).sum();
    let principal = bond.face_value;
    let total_coupon = conventions.round(gross - principal);

    let output = ScheduleOutput {
        bond_type: bond.bond_type,
        months_per_period: bond.months_per_period(),
        num_events: rows.len(),
        rows,
        total_coupon,
        principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Coupon schedule: whole-month steps from issue, final period pinned to maturity, ACT/365",
        request,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Number of coupon periods; zero selects a single principal payment.
fn period_count(bond: &BondTerms) -> u32 {
    if bond.bond_type == BondType::Zero || !bond.has_coupon() {
        return 0;
    }
    bond.num_periods.unwrap_or_else(|| {
        let step = bond.months_per_period().max(1);
        months_between_ceil(bond.issue_date, bond.maturity_date)
            .max(1)
            .div_ceil(step)
    })
}

fn rate_label(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

fn accrual_rows(
    issue_date: NaiveDate,
    events: &[CouponEvent],
    conventions: &PricingConventions,
) -> Vec<ScheduleRow> {
    let basis = conventions.basis();
    let mut previous = issue_date;
    events
        .iter()
        .map(|event| {
            let row = ScheduleRow {
                event: event.clone(),
                accrual_days: (event.date - previous).num_days(),
                year_fraction: year_fraction(previous, event.date, basis),
            };
            previous = event.date;
            row
        })
        .collect()
}
