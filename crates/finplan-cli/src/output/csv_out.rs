use serde_json::Value;
use std::io;

/// Write the response as CSV to stdout: yearly projection rows become CSV
/// records (one block per account), anything else falls back to field/value.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(simulations)) = map.get("simulations") {
                for sim in simulations {
                    let Some(sim_map) = sim.as_object() else { continue };
                    if let Some(Value::Array(rows)) = sim_map.get("yearly_projections") {
                        let name = sim_map
                            .get("account_name")
                            .and_then(Value::as_str)
                            .unwrap_or_default();
                        write_year_rows(&mut wtr, rows, Some(name));
                    }
                }
            } else if let Some(Value::Array(rows)) = map.get("yearly_projections") {
                write_year_rows(&mut wtr, rows, None);
            } else {
                write_field_value(&mut wtr, map);
            }
        }
        Value::Array(arr) => write_year_rows(&mut wtr, arr, None),
        other => {
            let _ = wtr.write_record([&format_csv_value(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_year_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value], account: Option<&str>) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let mut headers: Vec<String> = Vec::new();
    if account.is_some() {
        headers.push("account".into());
    }
    headers.extend(flatten_row(first).into_iter().map(|(k, _)| k));
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(row_map) = row {
            let mut record: Vec<String> = Vec::new();
            if let Some(name) = account {
                record.push(name.to_string());
            }
            record.extend(flatten_row(row_map).into_iter().map(|(_, v)| v));
            let _ = wtr.write_record(&record);
        }
    }
}

fn write_field_value(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn flatten_row(map: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    let mut cells = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (inner_key, inner_val) in inner {
                    cells.push((format!("{key}.{inner_key}"), format_csv_value(inner_val)));
                }
            }
            other => cells.push((key.clone(), format_csv_value(other))),
        }
    }
    cells
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
