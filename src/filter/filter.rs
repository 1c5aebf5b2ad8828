use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{FilterOrderInfo, FilterWhereInfo, SortDirection, SqlResult};
use crate::entity::EntityDescriptor;

/// Query description for one entity table: exact-match conditions, a single
/// sort key and optional pagination. Every column it references has been
/// resolved through the entity descriptor, so rendering never interpolates
/// caller-supplied identifiers.
#[derive(Debug, Clone)]
pub struct Filter {
    entity: &'static EntityDescriptor,
    conditions: Vec<FilterWhereInfo>,
    order: FilterOrderInfo,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new(entity: &'static EntityDescriptor) -> Self {
        Self {
            entity,
            conditions: vec![],
            order: FilterOrderInfo::id_desc(),
            limit: None,
            offset: None,
        }
    }

    pub fn entity(&self) -> &'static EntityDescriptor {
        self.entity
    }

    pub fn conditions(&self) -> &[FilterWhereInfo] {
        &self.conditions
    }

    pub fn order_info(&self) -> &FilterOrderInfo {
        &self.order
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    /// Restrict to rows owned by `user_id`; `None` leaves the query unscoped.
    pub fn owner(mut self, user_id: Option<&str>) -> Self {
        if let Some(user_id) = user_id {
            self.conditions.push(FilterWhereInfo {
                column: "user_id",
                column_type: crate::entity::ColumnType::Text,
                data: Value::String(user_id.to_string()),
            });
        }
        self
    }

    /// Match the row with this `id`. Ids are SERIAL, so one outside the
    /// int4 range matches nothing (rendered as `id = 0`).
    pub fn id(mut self, id: i64) -> Self {
        let id = i32::try_from(id).unwrap_or(0);
        self.conditions.push(FilterWhereInfo {
            column: "id",
            column_type: crate::entity::ColumnType::Integer,
            data: Value::from(id),
        });
        self
    }

    /// Apply `{field: value}` conditions, silently skipping keys that are
    /// not columns of the entity.
    pub fn where_clause(mut self, conditions: &Map<String, Value>) -> Result<Self, FilterError> {
        for (field, value) in conditions {
            if let Some(info) = FilterWhere::condition(self.entity, field, value)? {
                self.conditions.push(info);
            }
        }
        Ok(self)
    }

    /// Apply a single condition, failing when `field` is not a column.
    pub fn where_field(mut self, field: &str, value: &Value) -> Result<Self, FilterError> {
        let info = FilterWhere::condition(self.entity, field, value)?.ok_or_else(|| {
            FilterError::InvalidField {
                entity: self.entity.label.to_string(),
                field: field.to_string(),
            }
        })?;
        self.conditions.push(info);
        Ok(self)
    }

    /// Sort by a client-supplied key (`-` prefix for descending).
    pub fn sort(mut self, sort: Option<&str>) -> Self {
        self.order = FilterOrder::parse(self.entity, sort);
        self
    }

    pub fn order_by_id(mut self, sort: SortDirection) -> Self {
        self.order = FilterOrderInfo { column: "id", sort };
        self
    }

    pub fn limit(mut self, limit: i64, offset: Option<i64>) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    /// Full SELECT producing one `row` JSON column per matching record.
    pub fn to_sql(&self) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, 0);
        let inner = [
            format!("SELECT * FROM \"{}\"", self.entity.name),
            format!("WHERE {}", where_clause),
            FilterOrder::generate(&self.order),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult {
            query: format!("SELECT row_to_json(t) AS row FROM ({}) t", inner),
            params,
        }
    }

    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql(0);
        SqlResult {
            query: format!(
                "SELECT COUNT(*) AS count FROM \"{}\" WHERE {}",
                self.entity.name, where_result.query
            ),
            params: where_result.params,
        }
    }

    /// First matching id, row-locked for the enclosing transaction.
    pub fn to_lock_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql(0);
        SqlResult {
            query: format!(
                "SELECT \"id\"::BIGINT AS \"id\" FROM \"{}\" WHERE {} LIMIT 1 FOR UPDATE",
                self.entity.name, where_result.query
            ),
            params: where_result.params,
        }
    }

    pub fn to_delete_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql(0);
        SqlResult {
            query: format!("DELETE FROM \"{}\" WHERE {}", self.entity.name, where_result.query),
            params: where_result.params,
        }
    }

    pub fn to_where_sql(&self, starting_param_index: usize) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.conditions, starting_param_index);
        SqlResult { query, params }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::find_entity;
    use serde_json::json;

    fn caves() -> &'static EntityDescriptor {
        find_entity("active_caves_data").unwrap()
    }

    #[test]
    fn out_of_range_id_matches_nothing() {
        let filter = Filter::new(caves()).id(3_000_000_000);
        assert_eq!(filter.conditions()[0].data, json!(0));

        let filter = Filter::new(caves()).id(42);
        assert_eq!(filter.conditions()[0].data, json!(42));
    }

    #[test]
    fn renders_scoped_paginated_select() {
        let query = json!({ "anno": 2024, "colore": "rosso" });
        let filter = Filter::new(caves())
            .owner(Some("u1"))
            .where_clause(query.as_object().unwrap())
            .unwrap()
            .sort(Some("-numero_cave"))
            .limit(20, Some(40))
            .unwrap();

        let sql = filter.to_sql();
        assert_eq!(
            sql.query,
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"active_caves_data\" \
             WHERE \"user_id\" = $1::TEXT AND \"anno\" = $2::INTEGER \
             ORDER BY \"numero_cave\" DESC LIMIT 20 OFFSET 40) t"
        );
        assert_eq!(sql.params, vec![json!("u1"), json!(2024)]);
    }

    #[test]
    fn count_ignores_order_and_pagination() {
        let filter = Filter::new(caves()).owner(Some("u1")).limit(5, Some(10)).unwrap();
        let sql = filter.to_count_sql();
        assert_eq!(
            sql.query,
            "SELECT COUNT(*) AS count FROM \"active_caves_data\" WHERE \"user_id\" = $1::TEXT"
        );
    }

    #[test]
    fn unscoped_filter_matches_all_rows() {
        let sql = Filter::new(caves()).to_delete_sql();
        assert_eq!(sql.query, "DELETE FROM \"active_caves_data\" WHERE 1=1");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn lock_sql_combines_id_and_owner() {
        let sql = Filter::new(caves()).id(7).owner(Some("u1")).to_lock_sql();
        assert_eq!(
            sql.query,
            "SELECT \"id\"::BIGINT AS \"id\" FROM \"active_caves_data\" WHERE \"id\" = $1::INTEGER \
             AND \"user_id\" = $2::TEXT LIMIT 1 FOR UPDATE"
        );
        assert_eq!(sql.params, vec![json!(7), json!("u1")]);
    }

    #[test]
    fn where_field_rejects_unknown_column() {
        let err = Filter::new(caves()).where_field("colore", &json!("rosso")).unwrap_err();
        assert_eq!(err.to_string(), "Field colore does not exist on Active_caves_data");
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(matches!(
            Filter::new(caves()).limit(-1, None),
            Err(FilterError::InvalidLimit(_))
        ));
        assert!(matches!(
            Filter::new(caves()).limit(1, Some(-1)),
            Err(FilterError::InvalidOffset(_))
        ));
    }
}
