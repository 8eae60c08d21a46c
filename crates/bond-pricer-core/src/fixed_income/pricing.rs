//! Trade pricing: buy and sell prices, coupon income over the holding period,
//! and the per-bond investment-event table.
//!
//! Every cashflow is discounted with annual compounding at a single rate,
//! `1 / (1 + r)^(days / 365)`. The rate comes from the trade's discount
//! method:
//!
//! | Method | Rate |
//! |--------|------|
//! | coupon | flat coupon rate |
//! | spread | coupon rate + discount input |
//! | fixed  | discount input |
//!
//! The buy price of a fixed-coupon bond is the present value, as of the
//! bought date, of the full schedule. Cashflows dated before the bought date
//! are compounded forward rather than dropped; when that happens the output
//! carries a warning.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::conventions::PricingConventions;
use crate::error::PricerError;
use crate::fixed_income::schedule::{build_schedule, CouponEvent};
use crate::fixed_income::tax::TaxPolicy;
use crate::fixed_income::terms::{
    BondTerms, BondType, DiscountMethod, PricingRequest, ProductType, ResolvedRequest, TradeTerms,
};
use crate::time_value::{discount_factor, present_value, year_fraction};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Years};
use crate::PricerResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Present value of one scheduled cashflow as of the bought date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvRow {
    pub date: NaiveDate,
    pub amount: Money,
    pub year_fraction: Years,
    pub discount_factor: Decimal,
    pub present_value: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentEventKind {
    #[serde(rename = "Buy Bond")]
    BuyBond,
    #[serde(rename = "Coupon Received")]
    CouponReceived,
    #[serde(rename = "Sell Bond")]
    SellBond,
}

impl std::fmt::Display for InvestmentEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvestmentEventKind::BuyBond => write!(f, "Buy Bond"),
            InvestmentEventKind::CouponReceived => write!(f, "Coupon Received"),
            InvestmentEventKind::SellBond => write!(f, "Sell Bond"),
        }
    }
}

/// One row of the investment-event table. Amounts are per bond, net of tax
/// and fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentEvent {
    pub date: NaiveDate,
    pub event: InvestmentEventKind,
    pub amount: Money,
}

/// Position-level summary handed to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentSummary {
    /// Buy price including trading fee, times quantity.
    pub buy_price: Money,
    /// Sell price net of transaction tax, times quantity.
    pub sell_price: Money,
    /// Coupons received net of coupon tax, times quantity.
    pub coupon_received: Money,
    pub txn_tax: Rate,
    pub trading_fee: Rate,
    /// Chronological events, per bond.
    pub investment_table: Vec<InvestmentEvent>,
}

/// Unscaled per-bond figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerBondPrices {
    pub buy_price: Money,
    pub sell_price: Money,
    pub coupon_received: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradePricing {
    /// Resolved discount rate as a fraction.
    pub discount_rate: Rate,
    pub tax: TaxPolicy,
    pub per_bond: PerBondPrices,
    /// Buy price times quantity, before trading fee.
    pub buy_price_total: Money,
    /// Sell price times quantity, before transaction tax.
    pub sell_price_total: Money,
    pub summary: InvestmentSummary,
    pub pv_table: Vec<PvRow>,
}

/// Everything computed for one request, kept together for report building.
#[derive(Debug, Clone)]
pub struct PricedRequest {
    pub resolved: ResolvedRequest,
    pub schedule: Vec<CouponEvent>,
    pub pricing: TradePricing,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a trade and wrap the result in the standard envelope.
pub fn price_trade(request: &PricingRequest) -> PricerResult<ComputationOutput<TradePricing>> {
    let start = Instant::now();
    let priced = price_request(request)?;
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Bond trade pricing: annually compounded PV at ACT/365, client tax and trading fee adjusted",
        request,
        priced.warnings,
        elapsed,
        priced.pricing,
    ))
}

/// Resolve, schedule and price a request.
pub fn price_request(request: &PricingRequest) -> PricerResult<PricedRequest> {
    let resolved = request.resolve()?;
    let mut warnings = resolved.warnings.clone();

    let schedule = build_schedule(&resolved.bond, &resolved.conventions)?;
    let pricing = price(
        &resolved.bond,
        &schedule,
        &resolved.trade,
        &resolved.conventions,
        &mut warnings,
    )?;

    Ok(PricedRequest {
        resolved,
        schedule,
        pricing,
        warnings,
    })
}

/// Resolve the discount rate (as a fraction) from the trade's discount method.
pub fn resolve_discount_rate(bond: &BondTerms, trade: &TradeTerms) -> Rate {
    let pct = match trade.discount_method {
        DiscountMethod::Coupon => bond.coupon_rate,
        DiscountMethod::Spread => bond.coupon_rate + trade.discount_input,
        DiscountMethod::Fixed => trade.discount_input,
    };
    pct / dec!(100)
}

/// Price a trade against an already built schedule.
pub fn price(
    bond: &BondTerms,
    schedule: &[CouponEvent],
    trade: &TradeTerms,
    conventions: &PricingConventions,
    warnings: &mut Vec<String>,
) -> PricerResult<TradePricing> {
    let rate = resolve_discount_rate(bond, trade);
    let tax = TaxPolicy::for_client(trade.client_type);
    let fee = trade.trading_fee_rate();
    let basis = conventions.basis();

    let pv_table = build_pv_table(schedule, trade.bought_date, rate, basis)?;

    // --- Buy price ---
    let buy_price: Money = match bond.bond_type {
        BondType::Zero => {
            let years = year_fraction(trade.bought_date, bond.maturity_date, basis);
            present_value(bond.face_value, rate, years)?
        }
        BondType::Fixed => {
            let early = schedule
                .iter()
                .filter(|e| e.date < trade.bought_date)
                .count();
            if early > 0 {
                warnings.push(format!(
                    "{early} cashflow(s) dated before bought_date {} are included in the buy price",
                    trade.bought_date
                ));
            }
            pv_table
                .iter()
                .try_fold(Decimal::ZERO, |acc, row| acc.checked_add(row.present_value))
                .ok_or_else(|| PricerError::InvalidInput {
                    field: "discount_rate".into(),
                    reason: "Buy price overflows".into(),
                })?
        }
    };

    // --- Coupon income over the holding window ---
    let coupon_received: Money = schedule
        .iter()
        .filter(|e| trade.holds_on(e.date))
        .map(|e| e.amount * tax.coupon_net())
        .sum();

    // --- Sell price ---
    let sell_price: Money = match (bond.bond_type, trade.product_type) {
        (BondType::Zero, _) => {
            let years = year_fraction(trade.sold_date, bond.maturity_date, basis);
            present_value(bond.face_value, rate, years)?
        }
        (BondType::Fixed, ProductType::Outright) => {
            let net = Decimal::ONE - tax.txn_tax - fee;
            let mut remaining = Decimal::ZERO;
            for e in schedule.iter().filter(|e| e.date > trade.sold_date) {
                let years = year_fraction(trade.sold_date, e.date, basis);
                remaining += present_value(e.amount, rate, years)?;
            }
            remaining * net
        }
        (BondType::Fixed, ProductType::Repo) => {
            let net = Decimal::ONE - tax.txn_tax - fee;
            if net.is_zero() {
                return Err(PricerError::DivisionByZero {
                    context: "repo sell price (transaction tax plus trading fee equals 100%)"
                        .into(),
                });
            }
            let holding_years = Decimal::from(trade.holding_days()) / basis;
            let financed = buy_price * (Decimal::ONE + trade.trade_rate() * holding_years);
            (financed - coupon_received) / net
        }
    };

    tracing::debug!(
        %rate,
        %buy_price,
        %sell_price,
        %coupon_received,
        bond_type = %bond.bond_type,
        product_type = %trade.product_type,
        "trade priced"
    );

    let investment_table = build_investment_table(
        schedule,
        trade,
        &tax,
        fee,
        buy_price,
        sell_price,
        conventions,
    );

    let quantity = Decimal::from(trade.quantity);
    let summary = InvestmentSummary {
        buy_price: conventions.round(buy_price * (Decimal::ONE + fee) * quantity),
        sell_price: conventions.round(sell_price * (Decimal::ONE - tax.txn_tax) * quantity),
        coupon_received: conventions.round(coupon_received * quantity),
        txn_tax: tax.txn_tax,
        trading_fee: fee,
        investment_table,
    };

    Ok(TradePricing {
        discount_rate: rate,
        tax,
        per_bond: PerBondPrices {
            buy_price: conventions.round(buy_price),
            sell_price: conventions.round(sell_price),
            coupon_received: conventions.round(coupon_received),
        },
        buy_price_total: conventions.round(buy_price * quantity),
        sell_price_total: conventions.round(sell_price * quantity),
        summary,
        pv_table,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_pv_table(
    schedule: &[CouponEvent],
    valuation_date: NaiveDate,
    rate: Rate,
    basis: Decimal,
) -> PricerResult<Vec<PvRow>> {
    schedule
        .iter()
        .map(|e| {
            let years = year_fraction(valuation_date, e.date, basis);
            Ok(PvRow {
                date: e.date,
                amount: e.amount,
                year_fraction: years,
                discount_factor: discount_factor(rate, years)?,
                present_value: present_value(e.amount, rate, years)?,
            })
        })
        .collect()
}

fn build_investment_table(
    schedule: &[CouponEvent],
    trade: &TradeTerms,
    tax: &TaxPolicy,
    fee: Rate,
    buy_price: Money,
    sell_price: Money,
    conventions: &PricingConventions,
) -> Vec<InvestmentEvent> {
    let mut table = Vec::with_capacity(schedule.len() + 2);

    table.push(InvestmentEvent {
        date: trade.bought_date,
        event: InvestmentEventKind::BuyBond,
        amount: conventions.round(buy_price * (Decimal::ONE + fee)),
    });

    table.extend(
        schedule
            .iter()
            .filter(|e| trade.holds_on(e.date))
            .map(|e| InvestmentEvent {
                date: e.date,
                event: InvestmentEventKind::CouponReceived,
                amount: conventions.round(e.amount * tax.coupon_net()),
            }),
    );

    table.push(InvestmentEvent {
        date: trade.sold_date,
        event: InvestmentEventKind::SellBond,
        amount: conventions.round(sell_price * (Decimal::ONE - tax.txn_tax)),
    });

    table
}
