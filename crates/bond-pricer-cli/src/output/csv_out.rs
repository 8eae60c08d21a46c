use serde_json::{Map, Value};
use std::io;

/// Keys holding the main row list of a result, in lookup order.
const ROW_KEYS: [&str; 3] = ["rows", "investment_table", "pv_table"];

/// Write output as CSV to stdout. A result carrying a row list (schedule
/// rows, investment table) is written as that list; anything else as
/// field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => match find_rows(result) {
                Some(rows) => write_rows(&mut wtr, rows),
                None => write_fields(&mut wtr, result),
            },
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => wtr.write_record([format_csv_value(value)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn find_rows(result: &Map<String, Value>) -> Option<&[Value]> {
    for key in ROW_KEYS {
        if let Some(Value::Array(rows)) = result.get(key) {
            return Some(rows);
        }
    }
    // Pricing output keeps its investment table under `summary`.
    match result.get("summary") {
        Some(Value::Object(summary)) => match summary.get("investment_table") {
            Some(Value::Array(rows)) => Some(rows),
            _ => None,
        },
        _ => None,
    }
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    map: &Map<String, Value>,
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &format_csv_value(val)])?;
    }
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([format_csv_value(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(rows: &[Value]) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_rows(&mut wtr, rows).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_investment_rows_found_under_summary() {
        let result = json!({
            "buy_price_total": "105795.7557",
            "summary": {
                "buy_price": "105795.7557",
                "investment_table": [
                    {"date": "2022-01-01", "event": "Buy Bond", "amount": "-105795.7557"}
                ]
            }
        });
        let rows = find_rows(result.as_object().unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            render(rows),
            "date,event,amount\n2022-01-01,Buy Bond,-105795.7557\n"
        );
    }

    #[test]
    fn test_columns_follow_struct_field_order() {
        use bond_pricer_core::fixed_income::pricing::InvestmentEvent;

        let event: InvestmentEvent = serde_json::from_value(json!({
            "amount": "9975",
            "event": "Coupon Received",
            "date": "2023-06-09"
        }))
        .unwrap();
        let row = serde_json::to_value(event).unwrap();
        assert_eq!(render(&[row]), "date,event,amount\n2023-06-09,Coupon Received,9975\n");
    }

    #[test]
    fn test_schedule_rows_take_priority() {
        let result = json!({"rows": [{"date": "2024-06-09"}], "pv_table": []});
        assert_eq!(find_rows(result.as_object().unwrap()).unwrap().len(), 1);
    }
}
