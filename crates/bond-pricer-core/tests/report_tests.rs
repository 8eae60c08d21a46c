use bond_pricer_core::fixed_income::pricing;
use bond_pricer_core::fixed_income::terms::PricingRequest;
use bond_pricer_core::report::{a1, generate_report, CellMode};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;

fn request(bond_type: &str, product_type: &str) -> PricingRequest {
    serde_json::from_value(json!({
        "bond_type": bond_type,
        "issue_date": "2021-06-09",
        "maturity_date": "2024-06-09",
        "face_value": "100000",
        "coupon_rate": "10.5",
        "frequency": 1,
        "bought_date": "2022-01-01",
        "sold_date": "2023-12-01",
        "quantity": 3,
        "client_type": "Individual",
        "product_type": product_type,
        "discount_method": "Fixed",
        "discount_input": "8",
        "rate": "5"
    }))
    .unwrap()
}

#[test]
fn test_report_has_six_sheets_in_order() {
    let report = generate_report(&request("fixed", "Outright")).unwrap().result;
    let names: Vec<&str> = report.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Cash Flow Table",
            "User Input",
            "Tax Table",
            "PV Table",
            "Investment Summary",
            "Investment Table",
        ]
    );
}

#[test]
fn test_summary_cached_values_match_pricing() {
    let req = request("fixed", "Repo");
    let priced = pricing::price_trade(&req).unwrap().result;
    let report = generate_report(&req).unwrap().result;
    let summary = report.sheet("Investment Summary").unwrap();

    assert_eq!(summary.cell(0, 0).unwrap().as_number(), Some(priced.per_bond.buy_price));
    assert_eq!(summary.cell(0, 4).unwrap().as_number(), Some(priced.per_bond.sell_price));
    assert_eq!(summary.cell(0, 5).unwrap().as_number(), Some(dec!(3)));
    assert_eq!(summary.cell(0, 6).unwrap().as_number(), Some(priced.summary.buy_price));
}

#[test]
fn test_zero_bond_report_single_row_ranges() {
    let report = generate_report(&request("zero", "Outright")).unwrap().result;
    let pv = report.sheet("PV Table").unwrap();
    assert_eq!(pv.rows.len(), 1);

    let buy = report.sheet("Investment Summary").unwrap().cell(0, 0).unwrap();
    assert_eq!(a1::cell_text(buy, CellMode::Formulas), "=SUM('PV Table'!G2:G2)");
}

#[test]
fn test_user_input_carries_resolved_rate() {
    let report = generate_report(&request("fixed", "Outright")).unwrap().result;
    let ui = report.sheet("User Input").unwrap();
    assert_eq!(ui.rows.len(), 1);
    assert_eq!(a1::cell_text(ui.cell(0, 6).unwrap(), CellMode::Values), "fixed");
    assert_eq!(ui.cell(0, 8).unwrap().as_number(), Some(dec!(0.08)));
    assert_eq!(ui.header.last().map(String::as_str), Some("Apply Trading Fee"));
    assert_eq!(a1::cell_text(ui.cell(0, 13).unwrap(), CellMode::Values), "FALSE");
}

#[test]
fn test_investment_table_mirrors_engine() {
    let req = request("fixed", "Outright");
    let priced = pricing::price_trade(&req).unwrap().result;
    let report = generate_report(&req).unwrap().result;
    let sheet = report.sheet("Investment Table").unwrap();

    assert_eq!(sheet.rows.len(), priced.summary.investment_table.len());
    assert_eq!(
        a1::cell_text(sheet.cell(0, 1).unwrap(), CellMode::Values),
        "Buy Bond"
    );
}

#[test]
fn test_report_warnings_propagate() {
    let mut req = request("fixed", "Outright");
    req.product_type = "Swap".into();
    let out = generate_report(&req).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("Swap")));
}
