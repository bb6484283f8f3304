pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Fields holding row sets, in the order they are preferred when only one
/// can be shown.
pub const ROW_FIELDS: [&str; 5] = [
    "amortization_schedule",
    "pv_schedule",
    "rates",
    "leases",
    "rows",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The payload: the envelope's `result` when present, else the value itself.
pub fn payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// True for a non-empty array whose first element is an object.
pub fn is_row_set(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))))
}

/// The preferred row set inside an object, if any.
pub fn primary_rows(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    ROW_FIELDS
        .iter()
        .filter_map(|k| map.get(*k))
        .find(|v| is_row_set(v))
        .and_then(Value::as_array)
}

/// Render a scalar (or nested value) as a single cell.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_rows_prefers_amortization() {
        let value = json!({
            "pv_schedule": [{ "period": 1 }],
            "amortization_schedule": [{ "month": 1 }],
            "summary": { "total_payments": "100" }
        });
        let rows = primary_rows(value.as_object().unwrap()).unwrap();
        assert_eq!(rows[0]["month"], json!(1));
    }

    #[test]
    fn test_payload_unwraps_envelope() {
        let value = json!({ "result": { "a": 1 }, "warnings": [] });
        assert_eq!(payload(&value), &json!({ "a": 1 }));
        let bare = json!([1, 2]);
        assert_eq!(payload(&bare), &bare);
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(&json!("8.0000")), "8.0000");
        assert_eq!(format_cell(&json!(null)), "");
        assert_eq!(format_cell(&json!([1, "a"])), "1, a");
    }
}
