//! Bond and trade terms, and the request record they are resolved from.
//!
//! The request carries policy selectors as free-form labels. Each label maps
//! onto a typed variant; a label that matches nothing selects the policy's
//! fallback branch and leaves a warning on the resolved terms.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conventions::PricingConventions;
use crate::error::PricerError;
use crate::fixed_income::dates::parse_date;
use crate::types::{Money, Rate};
use crate::PricerResult;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Policy selectors
// ---------------------------------------------------------------------------

/// A policy selector parsed from a request label.
pub trait PolicyLabel: Sized + Copy + fmt::Display {
    /// Variant used when the label is not recognised.
    const FALLBACK: Self;

    fn parse_label(label: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondType {
    Fixed,
    Zero,
}

impl PolicyLabel for BondType {
    const FALLBACK: Self = BondType::Fixed;

    fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(BondType::Fixed),
            "zero" => Some(BondType::Zero),
            _ => None,
        }
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondType::Fixed => write!(f, "fixed"),
            BondType::Zero => write!(f, "zero"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientType {
    Individual,
    Corporation,
}

impl PolicyLabel for ClientType {
    const FALLBACK: Self = ClientType::Corporation;

    fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "individual" => Some(ClientType::Individual),
            "corporation" => Some(ClientType::Corporation),
            _ => None,
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::Individual => write!(f, "Individual"),
            ClientType::Corporation => write!(f, "Corporation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    Outright,
    Repo,
}

impl PolicyLabel for ProductType {
    const FALLBACK: Self = ProductType::Repo;

    fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "outright" => Some(ProductType::Outright),
            "repo" => Some(ProductType::Repo),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductType::Outright => write!(f, "Outright"),
            ProductType::Repo => write!(f, "Repo"),
        }
    }
}

/// How the pricing discount rate is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountMethod {
    /// Discount at the flat coupon rate.
    Coupon,
    /// Coupon rate plus a spread (the discount input).
    Spread,
    /// The discount input itself.
    Fixed,
}

impl PolicyLabel for DiscountMethod {
    const FALLBACK: Self = DiscountMethod::Fixed;

    fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "coupon" => Some(DiscountMethod::Coupon),
            "spread" => Some(DiscountMethod::Spread),
            "fixed" => Some(DiscountMethod::Fixed),
            _ => None,
        }
    }
}

impl fmt::Display for DiscountMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountMethod::Coupon => write!(f, "coupon"),
            DiscountMethod::Spread => write!(f, "spread"),
            DiscountMethod::Fixed => write!(f, "fixed"),
        }
    }
}

/// Map a label onto its policy, recording a warning when the fallback is used.
pub fn resolve_label<T: PolicyLabel>(field: &str, label: &str, warnings: &mut Vec<String>) -> T {
    match T::parse_label(label) {
        Some(v) => v,
        None => {
            let fallback = T::FALLBACK;
            tracing::warn!(field, label, %fallback, "unrecognised policy label");
            warnings.push(format!(
                "{field}: unrecognised value '{label}', falling back to '{fallback}'"
            ));
            fallback
        }
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// Contractual terms of the bond.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondTerms {
    pub bond_type: BondType,
    pub issue_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub face_value: Money,
    /// Flat annual coupon rate in percent (10.5 = 10.5%).
    pub coupon_rate: Decimal,
    /// Optional per-period coupon rates in percent, indexed by period.
    pub coupon_rates: Vec<Decimal>,
    /// Coupon payments per year. Always at least 1.
    pub frequency: u32,
    /// Explicit number of coupon periods, if the caller fixed it.
    pub num_periods: Option<u32>,
}

impl BondTerms {
    /// Months between coupon dates (integer division of 12 by frequency).
    pub fn months_per_period(&self) -> u32 {
        MONTHS_PER_YEAR / self.frequency.max(1)
    }

    /// Whether any coupon rate was supplied.
    pub fn has_coupon(&self) -> bool {
        !self.coupon_rate.is_zero() || !self.coupon_rates.is_empty()
    }

    /// Coupon rate (percent) applying to period `index`.
    pub fn period_rate(&self, index: usize) -> Decimal {
        self.coupon_rates
            .get(index)
            .copied()
            .unwrap_or(self.coupon_rate)
    }
}

/// Terms of the holding: when it was bought and sold, by whom, and how it is
/// priced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeTerms {
    pub bought_date: NaiveDate,
    pub sold_date: NaiveDate,
    pub quantity: u32,
    pub client_type: ClientType,
    pub product_type: ProductType,
    pub discount_method: DiscountMethod,
    /// Spread or fixed discount rate in percent, depending on the method.
    pub discount_input: Decimal,
    /// Trading fee in percent of price.
    pub trading_fee: Decimal,
    pub apply_trading_fee: bool,
    /// Trade (repo financing) rate in percent.
    pub rate: Decimal,
}

impl TradeTerms {
    /// Trading fee as a fraction, zero when the fee does not apply.
    pub fn trading_fee_rate(&self) -> Rate {
        if self.apply_trading_fee {
            self.trading_fee / dec!(100)
        } else {
            Decimal::ZERO
        }
    }

    /// Repo financing rate as a fraction.
    pub fn trade_rate(&self) -> Rate {
        self.rate / dec!(100)
    }

    pub fn holding_days(&self) -> i64 {
        (self.sold_date - self.bought_date).num_days()
    }

    /// True when `date` lies inside the holding window, both ends inclusive.
    pub fn holds_on(&self, date: NaiveDate) -> bool {
        self.bought_date <= date && date <= self.sold_date
    }
}

// ---------------------------------------------------------------------------
// Request record
// ---------------------------------------------------------------------------

fn default_bond_type() -> String {
    "fixed".into()
}

fn default_product_type() -> String {
    "Outright".into()
}

fn default_quantity() -> u32 {
    1
}

/// Parameters record as received from an API caller. Dates are `YYYY-MM-DD`
/// strings and every rate is quoted in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingRequest {
    #[serde(default = "default_bond_type")]
    pub bond_type: String,
    pub issue_date: String,
    pub maturity_date: String,
    pub face_value: Money,
    #[serde(default)]
    pub coupon_rate: Decimal,
    #[serde(default)]
    pub coupon_rates: Vec<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_periods: Option<u32>,
    pub bought_date: String,
    pub sold_date: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub client_type: String,
    #[serde(default = "default_product_type")]
    pub product_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_method: Option<String>,
    #[serde(default)]
    pub discount_input: Decimal,
    /// Older callers send a bare fixed discount rate instead of a method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<Decimal>,
    #[serde(default)]
    pub trading_fee: Decimal,
    #[serde(default)]
    pub apply_trading_fee: bool,
    #[serde(default)]
    pub rate: Decimal,
    #[serde(default)]
    pub conventions: PricingConventions,
}

/// Typed, validated view of a [`PricingRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRequest {
    pub bond: BondTerms,
    pub trade: TradeTerms,
    pub conventions: PricingConventions,
    pub warnings: Vec<String>,
}

impl PricingRequest {
    /// Parse dates, map policy labels and validate. All dates are parsed
    /// before anything else is computed, so a malformed date yields no
    /// partial result.
    pub fn resolve(&self) -> PricerResult<ResolvedRequest> {
        let issue_date = parse_date("issue_date", &self.issue_date)?;
        let maturity_date = parse_date("maturity_date", &self.maturity_date)?;
        let bought_date = parse_date("bought_date", &self.bought_date)?;
        let sold_date = parse_date("sold_date", &self.sold_date)?;

        self.conventions.validate()?;

        let mut warnings = Vec::new();

        let bond_type: BondType = resolve_label("bond_type", &self.bond_type, &mut warnings);
        let client_type: ClientType = resolve_label("client_type", &self.client_type, &mut warnings);
        let product_type: ProductType =
            resolve_label("product_type", &self.product_type, &mut warnings);

        let (discount_method, discount_input) = match (&self.discount_method, self.discount_rate) {
            (Some(label), _) => (
                resolve_label("discount_method", label, &mut warnings),
                self.discount_input,
            ),
            (None, Some(rate)) => (DiscountMethod::Fixed, rate),
            (None, None) => (DiscountMethod::Coupon, self.discount_input),
        };

        let frequency = match self.frequency {
            Some(f) if f > 0 => f as u32,
            Some(f) => {
                if bond_type == BondType::Fixed {
                    warnings.push(format!(
                        "frequency: {f} is not positive, coupons are paid annually"
                    ));
                }
                1
            }
            None => 1,
        };

        let bond = BondTerms {
            bond_type,
            issue_date,
            maturity_date,
            face_value: self.face_value,
            coupon_rate: self.coupon_rate,
            coupon_rates: self.coupon_rates.clone(),
            frequency,
            num_periods: self.num_periods,
        };

        let trade = TradeTerms {
            bought_date,
            sold_date,
            quantity: self.quantity,
            client_type,
            product_type,
            discount_method,
            discount_input,
            trading_fee: self.trading_fee,
            apply_trading_fee: self.apply_trading_fee,
            rate: self.rate,
        };

        validate_terms(&bond, &trade, &mut warnings)?;

        Ok(ResolvedRequest {
            bond,
            trade,
            conventions: self.conventions,
            warnings,
        })
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_terms(
    bond: &BondTerms,
    trade: &TradeTerms,
    warnings: &mut Vec<String>,
) -> PricerResult<()> {
    if bond.face_value <= Decimal::ZERO {
        return Err(PricerError::InvalidInput {
            field: "face_value".into(),
            reason: "Face value must be positive".into(),
        });
    }
    if bond.maturity_date <= bond.issue_date {
        return Err(PricerError::InvalidInput {
            field: "maturity_date".into(),
            reason: "Maturity date must be after issue date".into(),
        });
    }
    if bond.coupon_rate < Decimal::ZERO {
        return Err(PricerError::InvalidInput {
            field: "coupon_rate".into(),
            reason: "Coupon rate cannot be negative".into(),
        });
    }
    if let Some(i) = bond.coupon_rates.iter().position(|r| *r < Decimal::ZERO) {
        return Err(PricerError::InvalidInput {
            field: format!("coupon_rates[{i}]"),
            reason: "Coupon rate cannot be negative".into(),
        });
    }
    if bond.bond_type == BondType::Fixed {
        if bond.frequency > MONTHS_PER_YEAR {
            return Err(PricerError::InvalidInput {
                field: "frequency".into(),
                reason: "At most 12 coupon payments per year are supported".into(),
            });
        }
        if MONTHS_PER_YEAR % bond.frequency != 0 {
            warnings.push(format!(
                "frequency: {} does not divide 12, coupon periods are {} months",
                bond.frequency,
                bond.months_per_period()
            ));
        }
    }
    if trade.quantity == 0 {
        return Err(PricerError::InvalidInput {
            field: "quantity".into(),
            reason: "Quantity must be a positive integer".into(),
        });
    }
    if trade.trading_fee < Decimal::ZERO {
        return Err(PricerError::InvalidInput {
            field: "trading_fee".into(),
            reason: "Trading fee cannot be negative".into(),
        });
    }
    if trade.sold_date < trade.bought_date {
        warnings.push(format!(
            "sold_date {} precedes bought_date {}; holding period is negative",
            trade.sold_date, trade.bought_date
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> PricingRequest {
        serde_json::from_value(serde_json::json!({
            "bond_type": "fixed",
            "issue_date": "2021-06-09",
            "maturity_date": "2024-06-09",
            "face_value": 100000,
            "coupon_rate": 10.5,
            "frequency": 1,
            "bought_date": "2022-01-01",
            "sold_date": "2023-12-01",
            "quantity": 1,
            "client_type": "Individual",
            "product_type": "Outright",
            "discount_method": "coupon",
            "discount_input": 0,
            "trading_fee": 0,
            "apply_trading_fee": false,
            "rate": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_typed_terms() {
        let resolved = request().resolve().unwrap();
        assert_eq!(resolved.bond.bond_type, BondType::Fixed);
        assert_eq!(resolved.bond.coupon_rate, dec!(10.5));
        assert_eq!(resolved.trade.client_type, ClientType::Individual);
        assert_eq!(resolved.trade.product_type, ProductType::Outright);
        assert_eq!(resolved.trade.discount_method, DiscountMethod::Coupon);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_unknown_labels_fall_back_with_warning() {
        let mut req = request();
        req.client_type = "Individul".into();
        req.product_type = "outrite".into();
        req.discount_method = Some("yield".into());
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.trade.client_type, ClientType::Corporation);
        assert_eq!(resolved.trade.product_type, ProductType::Repo);
        assert_eq!(resolved.trade.discount_method, DiscountMethod::Fixed);
        assert_eq!(resolved.warnings.len(), 3);
        assert!(resolved.warnings[0].contains("client_type"));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let mut req = request();
        req.bond_type = "ZERO".into();
        req.client_type = "corporation".into();
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.bond.bond_type, BondType::Zero);
        assert_eq!(resolved.trade.client_type, ClientType::Corporation);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_legacy_discount_rate_selects_fixed() {
        let mut req = request();
        req.discount_method = None;
        req.discount_rate = Some(dec!(8));
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.trade.discount_method, DiscountMethod::Fixed);
        assert_eq!(resolved.trade.discount_input, dec!(8));
    }

    #[test]
    fn test_zero_frequency_is_annual() {
        let mut req = request();
        req.frequency = Some(0);
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.bond.frequency, 1);
        assert_eq!(resolved.bond.months_per_period(), 12);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_negative_frequency_is_annual() {
        let mut req = request();
        req.frequency = Some(-4);
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.bond.frequency, 1);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("-4"));
    }

    #[test]
    fn test_frequency_above_monthly_rejected() {
        let mut req = request();
        req.frequency = Some(13);
        assert!(matches!(
            req.resolve(),
            Err(PricerError::InvalidInput { ref field, .. }) if field == "frequency"
        ));
    }

    #[test]
    fn test_lowercase_individual_is_taxed_client() {
        let mut req = request();
        req.client_type = "individual".into();
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.trade.client_type, ClientType::Individual);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_invalid_date_rejected_before_anything_else() {
        let mut req = request();
        req.sold_date = "2021-13-40".into();
        req.face_value = dec!(-1);
        match req.resolve() {
            Err(PricerError::DateFormat { field, .. }) => assert_eq!(field, "sold_date"),
            other => panic!("Expected DateFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_maturity_before_issue_rejected() {
        let mut req = request();
        req.maturity_date = "2020-01-01".into();
        assert!(matches!(
            req.resolve(),
            Err(PricerError::InvalidInput { ref field, .. }) if field == "maturity_date"
        ));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut req = request();
        req.quantity = 0;
        assert!(req.resolve().is_err());
    }

    #[test]
    fn test_sold_before_bought_is_a_warning() {
        let mut req = request();
        req.sold_date = "2021-12-01".into();
        let resolved = req.resolve().unwrap();
        assert!(resolved.warnings.iter().any(|w| w.contains("precedes")));
    }

    #[test]
    fn test_trading_fee_only_when_applied() {
        let mut req = request();
        req.trading_fee = dec!(0.15);
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.trade.trading_fee_rate(), Decimal::ZERO);

        req.apply_trading_fee = true;
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.trade.trading_fee_rate(), dec!(0.0015));
    }

    #[test]
    fn test_period_rate_falls_back_to_flat_rate() {
        let mut req = request();
        req.coupon_rates = vec![dec!(9), dec!(10)];
        let resolved = req.resolve().unwrap();
        assert_eq!(resolved.bond.period_rate(0), dec!(9));
        assert_eq!(resolved.bond.period_rate(1), dec!(10));
        assert_eq!(resolved.bond.period_rate(2), dec!(10.5));
    }
}
