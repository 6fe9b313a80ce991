use serde_json::Value;

/// Print just the headline answer.
///
/// For retirement projections that is the final balance and 4%-rule income;
/// for mortgage comparisons the winning strategy and its advantage.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let summary = result
        .as_object()
        .and_then(|m| m.get("summary"))
        .unwrap_or(result);

    let priority_keys = [
        "winning_strategy",
        "net_advantage",
        "total_final_balance",
        "estimated_monthly_income",
        "months_saved",
        "interest_saved",
    ];

    if let Value::Object(map) = summary {
        let mut printed = false;
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}: {}", key, format_minimal(val));
                    printed = true;
                }
            }
        }
        if printed {
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(summary));
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
