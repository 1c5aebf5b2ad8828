use serde_json::{Map, Value};

use super::EntityDescriptor;

/// One table row (or row-shaped payload) as a JSON object.
pub type Record = Map<String, Value>;

/// Errors that can occur while turning API input into a row
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),
    #[error("Field '{field}' must be {expected}")]
    InvalidType { field: String, expected: &'static str },
}

/// Build an insertable row from a create payload.
///
/// Every domain column is present in the result (null when absent). Keys
/// that are not domain columns are dropped, including `id`; `user_id` is
/// always the caller's.
pub fn for_create(
    entity: &EntityDescriptor,
    payload: &Value,
    user_id: &str,
) -> Result<Record, RecordError> {
    let input = as_object(payload)?;
    let mut record = Record::new();

    for column in entity.columns {
        let raw = input.get(column.name).unwrap_or(&Value::Null);
        let value = column.column_type.coerce(raw).ok_or_else(|| RecordError::InvalidType {
            field: column.name.to_string(),
            expected: column.column_type.expected(),
        })?;

        if value.is_null() && column.required {
            return Err(RecordError::MissingRequiredField(column.name.to_string()));
        }
        record.insert(column.name.to_string(), value);
    }

    record.insert("user_id".to_string(), Value::String(user_id.to_string()));
    Ok(record)
}

/// Build the change set for a partial update.
///
/// Only domain columns carrying a non-null value are kept, so a payload
/// cannot clear a column and never touches `id` or `user_id`.
pub fn for_update(entity: &EntityDescriptor, payload: &Value) -> Result<Record, RecordError> {
    let input = as_object(payload)?;
    let mut changes = Record::new();

    for column in entity.columns {
        let Some(raw) = input.get(column.name) else { continue };
        if raw.is_null() {
            continue;
        }
        let value = column.column_type.coerce(raw).ok_or_else(|| RecordError::InvalidType {
            field: column.name.to_string(),
            expected: column.column_type.expected(),
        })?;
        changes.insert(column.name.to_string(), value);
    }

    Ok(changes)
}

pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, RecordError> {
    payload
        .as_object()
        .ok_or_else(|| RecordError::InvalidJson("Expected JSON object".to_string()))
}
