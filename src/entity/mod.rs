//! Static entity descriptors.
//!
//! Every REST resource is one table with the same shape: an integer `id`, a
//! `user_id` ownership column and a fixed set of scalar columns. The
//! descriptor is the only thing that differs between resources; services,
//! filters, stores and routers are all generic over it.

pub mod record;
pub mod registry;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Number, Value};

pub use record::{Record, RecordError};
pub use registry::{find_entity, registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Timestamp,
}

impl ColumnType {
    /// Postgres type used both for DDL and for casting bound parameters.
    pub fn pg_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Text => "TEXT",
            ColumnType::Timestamp => "TIMESTAMPTZ",
        }
    }

    /// Human readable name used in validation messages.
    pub fn expected(&self) -> &'static str {
        match self {
            ColumnType::Integer => "an integer",
            ColumnType::Float => "a number",
            ColumnType::Text => "a string",
            ColumnType::Timestamp => "an ISO 8601 datetime",
        }
    }

    /// Coerce an incoming JSON value to the canonical JSON form of this type.
    ///
    /// Null passes through untouched; nullability is the caller's concern.
    /// Returns `None` when the value cannot represent this type.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return Some(Value::Null);
        }

        match self {
            // INTEGER columns are int4
            ColumnType::Integer => match value {
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        i32::try_from(i).ok().map(Value::from)
                    } else {
                        let f = n.as_f64()?;
                        if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
                            Some(Value::from(f as i32))
                        } else {
                            None
                        }
                    }
                }
                Value::String(s) => s.trim().parse::<i32>().ok().map(Value::from),
                _ => None,
            },
            ColumnType::Float => {
                let f = match value {
                    Value::Number(n) => n.as_f64()?,
                    Value::String(s) => s.trim().parse::<f64>().ok()?,
                    _ => return None,
                };
                Number::from_f64(f).map(Value::Number)
            }
            ColumnType::Text => value.as_str().map(|s| Value::String(s.to_string())),
            ColumnType::Timestamp => {
                let s = value.as_str()?;
                parse_timestamp(s).map(|ts| Value::String(ts.to_rfc3339()))
            }
        }
    }
}

/// Accepts RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS[.f]` values (read as UTC).
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
    pub unique: bool,
}

impl ColumnDef {
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type, required: true, unique: false }
    }

    pub const fn optional(name: &'static str, column_type: ColumnType) -> Self {
        Self { name, column_type, required: false, unique: false }
    }

    pub const fn unique(self) -> Self {
        Self { unique: true, ..self }
    }
}

/// Primary key present on every entity table.
pub const ID_COLUMN: ColumnDef = ColumnDef::required("id", ColumnType::Integer);

/// Ownership column present on every entity table.
pub const USER_ID_COLUMN: ColumnDef = ColumnDef::required("user_id", ColumnType::Text);

#[derive(Debug)]
pub struct EntityDescriptor {
    /// Table name, also the path segment under `/api/v1/entities/`.
    pub name: &'static str,
    /// Display label used in client-facing messages.
    pub label: &'static str,
    /// Domain columns, excluding `id` and `user_id`.
    pub columns: &'static [ColumnDef],
}

impl EntityDescriptor {
    /// Resolve any column of the table, including `id` and `user_id`.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        match name {
            "id" => Some(&ID_COLUMN),
            "user_id" => Some(&USER_ID_COLUMN),
            _ => self.columns.iter().find(|c| c.name == name),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// All columns in table order: `id`, `user_id`, then domain columns.
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        [&ID_COLUMN, &USER_ID_COLUMN].into_iter().chain(self.columns.iter())
    }

    pub fn unique_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.unique)
    }
}
