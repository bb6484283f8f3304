use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_cell, is_row_set, payload};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into a Field/Value table; every row set (schedules,
/// rate entries, leases) gets a table of its own underneath.
pub fn print_table(value: &Value) {
    match payload(value) {
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", format_cell(other)),
    }

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut row_sets = Vec::new();
    for (key, val) in map {
        match val {
            v if is_row_set(v) => row_sets.push((key, v)),
            Value::Object(nested) => {
                for (inner, v) in nested {
                    builder.push_record([format!("{key}.{inner}"), format_cell(v)]);
                }
            }
            v => {
                builder.push_record([key.clone(), format_cell(v)]);
            }
        }
    }
    println!("{}", Table::from(builder));

    for (key, rows) in row_sets {
        if let Value::Array(arr) = rows {
            println!("\n{key}:");
            print_array_table(arr);
        }
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_cell(item));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
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

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
