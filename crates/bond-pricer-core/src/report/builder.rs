//! Assemble the pricing report from a priced request.
//!
//! Sheet order and layout:
//!
//! 1. Cash Flow Table: one row per coupon event
//! 2. User Input: trade terms and the resolved discount rate (row 2)
//! 3. Tax Table: one row per client type
//! 4. PV Table: discounting of each cashflow as of the bought date
//! 5. Investment Summary: prices and totals (row 2)
//! 6. Investment Table: the per-bond event table
//!
//! Every formula cell carries the engine's figure as its cached value.

use rust_decimal::Decimal;
use std::time::Instant;

use crate::fixed_income::pricing::{price_request, PricedRequest};
use crate::fixed_income::tax::TaxPolicy;
use crate::fixed_income::terms::{BondType, PricingRequest, ProductType};
use crate::report::{Cell, Expr, Report, Sheet, Value};
use crate::types::{with_metadata, ComputationOutput};
use crate::PricerResult;

pub const CASH_FLOW_SHEET: &str = "Cash Flow Table";
pub const USER_INPUT_SHEET: &str = "User Input";
pub const TAX_SHEET: &str = "Tax Table";
pub const PV_SHEET: &str = "PV Table";
pub const SUMMARY_SHEET: &str = "Investment Summary";
pub const INVESTMENT_TABLE_SHEET: &str = "Investment Table";

// Cash Flow Table columns
const CF_DATE: u32 = 0;
const CF_EX_DATE: u32 = 1;
const CF_RATE: u32 = 2;
const CF_AMOUNT: u32 = 3;

// User Input columns, all on row 2
const UI_ROW: u32 = 2;
const UI_BOUGHT: u32 = 0;
const UI_SOLD: u32 = 1;
const UI_QUANTITY: u32 = 2;
const UI_TRADE_RATE: u32 = 5;
const UI_DISCOUNT_RATE: u32 = 8;
const UI_TRADING_FEE: u32 = 9;
const UI_MATURITY: u32 = 11;
const UI_FACE_VALUE: u32 = 12;

// Tax Table columns
const TAX_COUPON: u32 = 1;
const TAX_TXN: u32 = 2;

// PV Table columns
const PV_YEAR_FRAC: u32 = 4;
const PV_FACTOR: u32 = 5;
const PV_VALUE: u32 = 6;

// Investment Summary columns, all on row 2
const IS_ROW: u32 = 2;
const IS_BUY: u32 = 0;
const IS_COUPON: u32 = 1;
const IS_TXN_TAX: u32 = 2;
const IS_FEE: u32 = 3;
const IS_SELL: u32 = 4;
const IS_QUANTITY: u32 = 5;

/// Resolve, price and lay out a request as a report.
pub fn generate_report(request: &PricingRequest) -> PricerResult<ComputationOutput<Report>> {
    let start = Instant::now();
    let priced = price_request(request)?;
    let report = build_report(&priced);
    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Pricing report: cash flow, input, tax, PV, summary and investment sheets",
        request,
        priced.warnings,
        elapsed,
        report,
    ))
}

pub fn build_report(priced: &PricedRequest) -> Report {
    let last_row = Sheet::row_number(priced.schedule.len().saturating_sub(1));

    Report {
        sheets: vec![
            cash_flow_sheet(priced),
            user_input_sheet(priced),
            tax_sheet(),
            pv_sheet(priced),
            summary_sheet(priced, last_row),
            investment_table_sheet(priced),
        ],
    }
}

// ---------------------------------------------------------------------------
// Sheets
// ---------------------------------------------------------------------------

fn cash_flow_sheet(priced: &PricedRequest) -> Sheet {
    let mut sheet = Sheet::new(
        CASH_FLOW_SHEET,
        &["Coupon Date", "Ex-Coupon Date", "Coupon Rate", "Cashflow"],
    );
    for event in &priced.schedule {
        sheet.push_row(vec![
            Cell::date(event.date),
            Cell::date(event.ex_date),
            Cell::text(event.rate_label.clone()),
            Cell::number(event.amount),
        ]);
    }
    sheet
}

fn user_input_sheet(priced: &PricedRequest) -> Sheet {
    let bond = &priced.resolved.bond;
    let trade = &priced.resolved.trade;

    let mut sheet = Sheet::new(
        USER_INPUT_SHEET,
        &[
            "Bought Date",
            "Sold Date",
            "Quantity",
            "Client Type",
            "Product Type",
            "Trade Rate",
            "Discount Method",
            "Discount Input",
            "Discount Rate",
            "Trading Fee",
            "Bond Type",
            "Maturity Date",
            "Face Value",
            "Apply Trading Fee",
        ],
    );
    sheet.push_row(vec![
        Cell::date(trade.bought_date),
        Cell::date(trade.sold_date),
        Cell::number(Decimal::from(trade.quantity)),
        Cell::text(trade.client_type.to_string()),
        Cell::text(trade.product_type.to_string()),
        Cell::number(trade.trade_rate()),
        Cell::text(trade.discount_method.to_string()),
        Cell::number(trade.discount_input),
        Cell::number(priced.pricing.discount_rate),
        Cell::number(trade.trading_fee_rate()),
        Cell::text(bond.bond_type.to_string()),
        Cell::date(bond.maturity_date),
        Cell::number(bond.face_value),
        Cell::boolean(trade.apply_trading_fee),
    ]);
    sheet
}

fn tax_sheet() -> Sheet {
    let mut sheet = Sheet::new(TAX_SHEET, &["Client Type", "Coupon Tax", "Transaction Tax"]);
    for (client, policy) in TaxPolicy::table() {
        sheet.push_row(vec![
            Cell::text(client.to_string()),
            Cell::number(policy.coupon_tax),
            Cell::number(policy.txn_tax),
        ]);
    }
    sheet
}

fn pv_sheet(priced: &PricedRequest) -> Sheet {
    let basis = priced.resolved.conventions.basis();
    let mut sheet = Sheet::new(
        PV_SHEET,
        &[
            "Coupon Date",
            "Ex-Coupon Date",
            "Coupon Rate",
            "Cashflow",
            "Year Frac",
            "Discount Factor",
            "Present Value",
        ],
    );

    for (i, (event, pv)) in priced
        .schedule
        .iter()
        .zip(&priced.pricing.pv_table)
        .enumerate()
    {
        let row = Sheet::row_number(i);
        let cf = |column| Expr::sheet_cell(CASH_FLOW_SHEET, column, row);

        let year_frac = (Expr::cell(0, row) - ui(UI_BOUGHT)) / Expr::num(basis);
        let factor = Expr::num(Decimal::ONE)
            / (Expr::num(Decimal::ONE) + ui(UI_DISCOUNT_RATE)).pow(Expr::cell(PV_YEAR_FRAC, row));
        let value = Expr::cell(CF_AMOUNT, row) * Expr::cell(PV_FACTOR, row);

        sheet.push_row(vec![
            Cell::formula(cf(CF_DATE), Value::Date(event.date)),
            Cell::formula(cf(CF_EX_DATE), Value::Date(event.ex_date)),
            Cell::formula(cf(CF_RATE), Value::Text(event.rate_label.clone())),
            Cell::formula(cf(CF_AMOUNT), Value::Number(event.amount)),
            Cell::formula(year_frac, Value::Number(pv.year_fraction)),
            Cell::formula(factor, Value::Number(pv.discount_factor)),
            Cell::formula(value, Value::Number(pv.present_value)),
        ]);
    }
    sheet
}

fn summary_sheet(priced: &PricedRequest, last_row: u32) -> Sheet {
    let bond = &priced.resolved.bond;
    let trade = &priced.resolved.trade;
    let pricing = &priced.pricing;
    let basis = priced.resolved.conventions.basis();

    let tax_row = TaxPolicy::table()
        .iter()
        .position(|(client, _)| *client == trade.client_type)
        .map(Sheet::row_number)
        .unwrap_or(2);

    let cf_col = |column| Expr::sheet_column(CASH_FLOW_SHEET, column, 2, last_row);
    let one = || Expr::num(Decimal::ONE);
    let local = |column| Expr::cell(column, IS_ROW);
    let net_of_deductions = || one() - local(IS_TXN_TAX) - local(IS_FEE);

    let buy = Expr::call(
        "SUM",
        vec![Expr::sheet_column(PV_SHEET, PV_VALUE, 2, last_row)],
    );

    let in_window = cf_col(CF_DATE).ge(ui(UI_BOUGHT)) * cf_col(CF_DATE).le(ui(UI_SOLD));
    let coupon = Expr::call("SUMPRODUCT", vec![in_window * cf_col(CF_AMOUNT)])
        * (one() - Expr::sheet_cell(TAX_SHEET, TAX_COUPON, tax_row));

    let sell = match (bond.bond_type, trade.product_type) {
        (BondType::Zero, _) => {
            let years = (ui(UI_MATURITY) - ui(UI_SOLD)) / Expr::num(basis);
            ui(UI_FACE_VALUE) / (one() + ui(UI_DISCOUNT_RATE)).pow(years)
        }
        (BondType::Fixed, ProductType::Outright) => {
            let after_sale = cf_col(CF_DATE).gt(ui(UI_SOLD));
            let years = (cf_col(CF_DATE) - ui(UI_SOLD)) / Expr::num(basis);
            let discounted = cf_col(CF_AMOUNT) / (one() + ui(UI_DISCOUNT_RATE)).pow(years);
            Expr::call("SUMPRODUCT", vec![after_sale * discounted]) * net_of_deductions()
        }
        (BondType::Fixed, ProductType::Repo) => {
            let holding = (ui(UI_SOLD) - ui(UI_BOUGHT)) / Expr::num(basis);
            let financed = local(IS_BUY) * (one() + ui(UI_TRADE_RATE) * holding);
            (financed - local(IS_COUPON)) / net_of_deductions()
        }
    };

    let summary = &pricing.summary;
    let mut sheet = Sheet::new(
        SUMMARY_SHEET,
        &[
            "Buy Price",
            "Coupon Received",
            "Transaction Tax Rate",
            "Trading Fee",
            "Sell Price",
            "Quantity",
            "Total Buy (incl. fee)",
            "Total Coupon Received",
            "Total Sell (net of tax)",
        ],
    );
    sheet.push_row(vec![
        Cell::formula(buy, Value::Number(pricing.per_bond.buy_price)),
        Cell::formula(coupon, Value::Number(pricing.per_bond.coupon_received)),
        Cell::formula(
            Expr::sheet_cell(TAX_SHEET, TAX_TXN, tax_row),
            Value::Number(summary.txn_tax),
        ),
        Cell::formula(ui(UI_TRADING_FEE), Value::Number(summary.trading_fee)),
        Cell::formula(sell, Value::Number(pricing.per_bond.sell_price)),
        Cell::formula(
            ui(UI_QUANTITY),
            Value::Number(Decimal::from(trade.quantity)),
        ),
        Cell::formula(
            local(IS_BUY) * (one() + local(IS_FEE)) * local(IS_QUANTITY),
            Value::Number(summary.buy_price),
        ),
        Cell::formula(
            local(IS_COUPON) * local(IS_QUANTITY),
            Value::Number(summary.coupon_received),
        ),
        Cell::formula(
            local(IS_SELL) * (one() - local(IS_TXN_TAX)) * local(IS_QUANTITY),
            Value::Number(summary.sell_price),
        ),
    ]);
    sheet
}

fn investment_table_sheet(priced: &PricedRequest) -> Sheet {
    let mut sheet = Sheet::new(INVESTMENT_TABLE_SHEET, &["Date", "Event", "Amount"]);
    for row in &priced.pricing.summary.investment_table {
        sheet.push_row(vec![
            Cell::date(row.date),
            Cell::text(row.event.to_string()),
            Cell::number(row.amount),
        ]);
    }
    sheet
}

fn ui(column: u32) -> Expr {
    Expr::sheet_cell(USER_INPUT_SHEET, column, UI_ROW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::a1;
    use rust_decimal_macros::dec;

    fn request(product_type: &str, bond_type: &str) -> PricingRequest {
        serde_json::from_value(serde_json::json!({
            "bond_type": bond_type,
            "issue_date": "2021-06-09",
            "maturity_date": "2024-06-09",
            "face_value": 100000,
            "coupon_rate": 10.5,
            "frequency": 1,
            "bought_date": "2022-01-01",
            "sold_date": "2023-12-01",
            "quantity": 2,
            "client_type": "Individual",
            "product_type": product_type,
            "discount_method": "coupon",
            "rate": 5
        }))
        .unwrap()
    }

    fn report(product_type: &str, bond_type: &str) -> Report {
        let priced = price_request(&request(product_type, bond_type)).unwrap();
        build_report(&priced)
    }

    fn formula_at(report: &Report, sheet: &str, row: usize, column: usize) -> String {
        let cell = report.sheet(sheet).unwrap().cell(row, column).unwrap();
        match cell {
            Cell::Formula { expr, .. } => a1::formula(expr),
            other => panic!("Expected a formula in {sheet}, got {other:?}"),
        }
    }

    #[test]
    fn test_sheet_order() {
        let r = report("Outright", "fixed");
        let names: Vec<&str> = r.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                CASH_FLOW_SHEET,
                USER_INPUT_SHEET,
                TAX_SHEET,
                PV_SHEET,
                SUMMARY_SHEET,
                INVESTMENT_TABLE_SHEET
            ]
        );
    }

    #[test]
    fn test_cash_flow_rows_match_schedule() {
        let r = report("Outright", "fixed");
        let cf = r.sheet(CASH_FLOW_SHEET).unwrap();
        assert_eq!(cf.rows.len(), 3);
        assert_eq!(cf.cell(2, 3).unwrap().as_number(), Some(dec!(110528.7671)));
    }

    #[test]
    fn test_pv_formulas_reference_other_sheets() {
        let r = report("Outright", "fixed");
        assert_eq!(formula_at(&r, PV_SHEET, 0, 3), "='Cash Flow Table'!D2");
        assert_eq!(formula_at(&r, PV_SHEET, 1, 4), "=(A3-'User Input'!A2)/365");
        assert_eq!(formula_at(&r, PV_SHEET, 1, 5), "=1/(1+'User Input'!I2)^E3");
        assert_eq!(formula_at(&r, PV_SHEET, 2, 6), "=D4*F4");
    }

    #[test]
    fn test_summary_buy_and_coupon_formulas() {
        let r = report("Outright", "fixed");
        assert_eq!(formula_at(&r, SUMMARY_SHEET, 0, 0), "=SUM('PV Table'!G2:G4)");
        assert_eq!(
            formula_at(&r, SUMMARY_SHEET, 0, 1),
            "=SUMPRODUCT(('Cash Flow Table'!A2:A4>='User Input'!A2)*('Cash Flow Table'!A2:A4<='User Input'!B2)*'Cash Flow Table'!D2:D4)*(1-'Tax Table'!B2)"
        );
    }

    #[test]
    fn test_summary_sell_formula_per_product() {
        let outright = report("Outright", "fixed");
        assert_eq!(
            formula_at(&outright, SUMMARY_SHEET, 0, 4),
            "=SUMPRODUCT(('Cash Flow Table'!A2:A4>'User Input'!B2)*('Cash Flow Table'!D2:D4/(1+'User Input'!I2)^(('Cash Flow Table'!A2:A4-'User Input'!B2)/365)))*(1-C2-D2)"
        );

        let repo = report("Repo", "fixed");
        assert_eq!(
            formula_at(&repo, SUMMARY_SHEET, 0, 4),
            "=(A2*(1+'User Input'!F2*(('User Input'!B2-'User Input'!A2)/365))-B2)/(1-C2-D2)"
        );

        let zero = report("Outright", "zero");
        assert_eq!(
            formula_at(&zero, SUMMARY_SHEET, 0, 4),
            "='User Input'!M2/(1+'User Input'!I2)^(('User Input'!L2-'User Input'!B2)/365)"
        );
    }

    #[test]
    fn test_cached_values_match_engine() {
        let priced = price_request(&request("Outright", "fixed")).unwrap();
        let r = build_report(&priced);
        let summary = r.sheet(SUMMARY_SHEET).unwrap();

        assert_eq!(
            summary.cell(0, 0).unwrap().as_number(),
            Some(priced.pricing.per_bond.buy_price)
        );
        assert_eq!(
            summary.cell(0, 6).unwrap().as_number(),
            Some(priced.pricing.summary.buy_price)
        );
        assert_eq!(summary.cell(0, 5).unwrap().as_number(), Some(dec!(2)));
    }

    #[test]
    fn test_investment_table_sheet() {
        let r = report("Outright", "fixed");
        let table = r.sheet(INVESTMENT_TABLE_SHEET).unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.cell(0, 1), Some(&Cell::text("Buy Bond")));
        assert_eq!(table.cell(3, 1), Some(&Cell::text("Sell Bond")));
    }

    #[test]
    fn test_corporation_references_second_tax_row() {
        let mut req = request("Outright", "fixed");
        req.client_type = "Corporation".into();
        let r = build_report(&price_request(&req).unwrap());
        assert_eq!(formula_at(&r, SUMMARY_SHEET, 0, 2), "='Tax Table'!C3");
    }
}
