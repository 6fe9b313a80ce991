use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Render the response as tables: one per-year table for every account or
/// scenario series, then the summary as a field/value table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope_extras(map);
            } else {
                print_field_value(value);
            }
        }
        Value::Array(arr) => print_year_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value) {
    let Some(map) = result.as_object() else {
        println!("{}", result);
        return;
    };

    // Retirement response: one yearly table per account
    if let Some(Value::Array(simulations)) = map.get("simulations") {
        for sim in simulations {
            let Some(sim_map) = sim.as_object() else { continue };
            if let Some(Value::String(name)) = sim_map.get("account_name") {
                println!("{}", name);
            }
            if let Some(Value::Array(rows)) = sim_map.get("yearly_projections") {
                print_year_rows(rows);
            }
            println!();
        }
    }

    // Mortgage response: paired scenario columns per year
    if let Some(Value::Array(rows)) = map.get("yearly_projections") {
        print_year_rows(rows);
        println!();
    }

    if let Some(Value::Object(summary)) = map.get("summary") {
        println!("Summary:");
        print_field_value(&Value::Object(summary.clone()));
    } else if !map.contains_key("simulations") && !map.contains_key("yearly_projections") {
        print_field_value(result);
    }
}

/// One table row per year. Nested objects (scenario_a/scenario_b) flatten
/// into dotted column headers.
fn print_year_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<String> = flatten_row(first).into_iter().map(|(k, _)| k).collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));

    for row in rows {
        if let Value::Object(row_map) = row {
            let flat = flatten_row(row_map);
            let cells: Vec<String> = headers
                .iter()
                .map(|h| {
                    flat.iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_default()
                })
                .collect();
            builder.push_record(cells);
        }
    }

    println!("{}", Table::from(builder));
}

fn flatten_row(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut cells = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (inner_key, inner_val) in inner {
                    cells.push((format!("{key}.{inner_key}"), format_value(inner_val)));
                }
            }
            other => cells.push((key.clone(), format_value(other))),
        }
    }
    cells
}

fn print_field_value(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    } else {
        println!("{}", value);
    }
}

fn print_envelope_extras(envelope: &serde_json::Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
