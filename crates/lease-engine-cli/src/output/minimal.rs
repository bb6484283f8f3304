use serde_json::Value;

use super::{format_cell, payload};

/// Print just the key answer value from the output.
///
/// Looks for well-known fields in priority order (descending into
/// `summary` and `selection`), then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = payload(value);

    let priority_keys = [
        "total_present_value",
        "periodic_rate_percent",
        "annual_rate_percent",
        "lease_term_bucket",
        "discount_rate_annual_percent",
        "final_closing_liability",
    ];

    if let Value::Object(map) = result_obj {
        let scopes = [
            Some(map),
            map.get("summary").and_then(Value::as_object),
            map.get("selection").and_then(Value::as_object),
        ];
        for key in &priority_keys {
            for scope in scopes.iter().flatten() {
                if let Some(val) = scope.get(*key) {
                    if !val.is_null() {
                        println!("{}", format_cell(val));
                        return;
                    }
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_cell(val));
            return;
        }
    }

    if let Value::Array(arr) = result_obj {
        println!("{}", arr.len());
        return;
    }

    println!("{}", format_cell(result_obj));
}
