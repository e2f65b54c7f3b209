use serde::Serialize;
use serde_json::{Map, Value};
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};

/// One entity to be masked: field name to JSON value, in input order.
pub type Record = Map<String, Value>;

/// Parse a JSON document holding an array of record objects.
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    let document: Value = serde_json::from_str(content)?;
    let Value::Array(items) = document else {
        return Err(Error::InvalidRecords(
            "input must contain a JSON array of records".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(Error::InvalidRecords(format!(
                "record {idx} must be a JSON object, found {}",
                kind_name(&other)
            ))),
        })
        .collect()
}

/// Serialize records as a 4-space indented JSON array.
pub fn records_to_json_pretty(records: &[Record]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
