use serde_json::Value;

/// Result fields printed by `--output minimal`, in priority order.
const PRIORITY_KEYS: [&str; 5] = [
    "buy_price_total",
    "total_coupon",
    "directory",
    "num_events",
    "sell_price_total",
];

/// Print just the headline value of the result: the first priority key
/// present, else the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(val) = PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null())
        {
            return format_minimal(val);
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_headline() {
        let v = json!({"result": {"discount_rate": "0.08", "buy_price_total": "82889.7786"}});
        assert_eq!(minimal_line(&v), "82889.7786");
    }

    #[test]
    fn test_schedule_headline() {
        let v = json!({"result": {"bond_type": "Fixed", "total_coupon": "31528.7671"}});
        assert_eq!(minimal_line(&v), "31528.7671");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let v = json!({"result": {"alpha": 1}});
        assert_eq!(minimal_line(&v), "alpha: 1");
    }
}
