use serde_json::Value;
use sqlx::{postgres::PgArguments, postgres::PgRow, Executor, Postgres, Row};

use crate::database::manager::DatabaseError;
use crate::entity::{EntityDescriptor, Record};
use crate::filter::SqlResult;

/// SQL for statements that are not plain filtered reads.
pub struct QueryBuilder;

impl QueryBuilder {
    /// INSERT of every column present in `record`, returning the stored row as JSON.
    pub fn insert(entity: &EntityDescriptor, record: &Record) -> SqlResult {
        let mut columns = Vec::new();
        let mut placeholders = Vec::new();
        let mut params = Vec::new();

        for column in entity.all_columns().filter(|c| c.name != "id") {
            let Some(value) = record.get(column.name) else { continue };
            params.push(value.clone());
            columns.push(format!("\"{}\"", column.name));
            placeholders.push(format!("${}::{}", params.len(), column.column_type.pg_type()));
        }

        SqlResult {
            query: format!(
                "WITH ins AS (INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *) \
                 SELECT row_to_json(ins) AS row FROM ins",
                entity.name,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params,
        }
    }

    /// UPDATE of the row with `id`, setting only the columns in `changes`.
    /// `id` and `user_id` are never written.
    pub fn update(entity: &EntityDescriptor, id: i64, changes: &Record) -> SqlResult {
        let mut assignments = Vec::new();
        let mut params = Vec::new();

        for column in entity.columns {
            let Some(value) = changes.get(column.name) else { continue };
            params.push(value.clone());
            assignments.push(format!(
                "\"{}\" = ${}::{}",
                column.name,
                params.len(),
                column.column_type.pg_type()
            ));
        }

        params.push(Value::from(id));
        SqlResult {
            query: format!(
                "WITH upd AS (UPDATE \"{}\" SET {} WHERE \"id\" = ${}::INTEGER RETURNING *) \
                 SELECT row_to_json(upd) AS row FROM upd",
                entity.name,
                assignments.join(", "),
                params.len()
            ),
            params,
        }
    }
}

pub fn build_query(sql: &SqlResult) -> sqlx::query::Query<'_, Postgres, PgArguments> {
    let mut q = sqlx::query(&sql.query);
    for p in sql.params.iter() {
        q = bind_param_query(q, p);
    }
    q
}

pub async fn fetch_records<'c, E>(executor: E, sql: &SqlResult) -> Result<Vec<Record>, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows = build_query(sql).fetch_all(executor).await?;
    rows.iter().map(row_to_record).collect()
}

pub async fn fetch_optional_record<'c, E>(
    executor: E,
    sql: &SqlResult,
) -> Result<Option<Record>, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = build_query(sql).fetch_optional(executor).await?;
    row.as_ref().map(row_to_record).transpose()
}

pub async fn fetch_count<'c, E>(executor: E, sql: &SqlResult) -> Result<i64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = build_query(sql).fetch_one(executor).await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}

pub async fn execute<'c, E>(executor: E, sql: &SqlResult) -> Result<u64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let result = build_query(sql).execute(executor).await?;
    Ok(result.rows_affected())
}

fn row_to_record(row: &PgRow) -> Result<Record, DatabaseError> {
    let value: Value = row.try_get("row")?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!("unexpected record format: {}", other))),
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
