use serde_json::Value;

use crate::entity::ColumnType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Exact-match condition on one declared column. `data` is already coerced
/// to the column type; null means `IS NULL`.
#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    pub column: &'static str,
    pub column_type: ColumnType,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

impl FilterOrderInfo {
    /// Newest rows first.
    pub const fn id_desc() -> Self {
        Self { column: "id", sort: SortDirection::Desc }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}
