use serde_json::Value;

use super::error::FilterError;
use super::types::FilterWhereInfo;
use crate::entity::EntityDescriptor;

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Resolve `field` against the entity and coerce `value` to its type.
    /// Returns `Ok(None)` when the entity has no such column.
    pub fn condition(
        entity: &'static EntityDescriptor,
        field: &str,
        value: &Value,
    ) -> Result<Option<FilterWhereInfo>, FilterError> {
        let Some(column) = entity.column(field) else {
            return Ok(None);
        };
        let data = column.column_type.coerce(value).ok_or_else(|| FilterError::InvalidValue {
            field: column.name.to_string(),
            expected: column.column_type.expected(),
        })?;
        Ok(Some(FilterWhereInfo {
            column: column.name,
            column_type: column.column_type,
            data,
        }))
    }

    /// Render conditions as an AND-ed predicate with positional parameters
    /// numbered after `starting_param_index`.
    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> (String, Vec<Value>) {
        let mut filter_where = Self::new(starting_param_index);
        let clause = filter_where.build(conditions);
        (clause, filter_where.param_values)
    }

    fn build(&mut self, conditions: &[FilterWhereInfo]) -> String {
        if conditions.is_empty() {
            return "1=1".to_string();
        }
        conditions
            .iter()
            .map(|c| self.build_sql_condition(c))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let quoted_column = format!("\"{}\"", condition.column);
        if condition.data.is_null() {
            format!("{} IS NULL", quoted_column)
        } else {
            let param = self.param(condition.data.clone());
            format!("{} = {}::{}", quoted_column, param, condition.column_type.pg_type())
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
