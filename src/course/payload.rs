use serde_json::Value;

use super::RawRecord;

/// The upstream payload did not contain a list of records.
#[derive(Debug)]
pub enum PayloadError {
    Decode(serde_json::Error),
    NoRecordArray { found: &'static str },
}

impl std::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadError::Decode(err) => write!(f, "payload is not valid JSON: {err}"),
            PayloadError::NoRecordArray { found } => {
                write!(f, "expected an array of records or an object with an `items`/`data` array, found {found}")
            }
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PayloadError::Decode(err) => Some(err),
            PayloadError::NoRecordArray { .. } => None,
        }
    }
}

pub fn parse_records(body: &str) -> Result<Vec<RawRecord>, PayloadError> {
    let value: Value = serde_json::from_str(body).map_err(PayloadError::Decode)?;
    records_from_value(value)
}

/// Accepts a bare array, or `{ "items": [...] }` / `{ "data": [...] }`.
/// Entries that are not objects are skipped.
pub fn records_from_value(value: Value) -> Result<Vec<RawRecord>, PayloadError> {
    let array = match value {
        Value::Array(a) => a,
        Value::Object(mut map) => match ["items", "data"].iter().find_map(|k| match map.remove(*k) {
            Some(Value::Array(a)) => Some(a),
            _ => None,
        }) {
            Some(a) => a,
            None => return Err(PayloadError::NoRecordArray { found: "an object without an items/data array" }),
        },
        other => return Err(PayloadError::NoRecordArray { found: kind_of(&other) }),
    };

    let total = array.len();
    let records: Vec<RawRecord> = array
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if records.len() < total {
        tracing::debug!(skipped = total - records.len(), "skipping non-object entries in payload");
    }
    Ok(records)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
