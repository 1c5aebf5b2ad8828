//! In-memory `EntityStore` and HTTP helpers for unit tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{generate_jwt, Claims};
use crate::database::manager::DatabaseError;
use crate::database::store::EntityStore;
use crate::entity::{record, EntityDescriptor, Record};
use crate::filter::{Filter, SortDirection};
use crate::routes::{app, AppState};

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: Vec<Record>,
}

/// Store keeping every table in a `Vec`, evaluating filters the way
/// Postgres would (NULLS LAST ascending, NULLS FIRST descending).
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<&'static str, Table>>,
    inserts_left: Mutex<Option<usize>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert after the first `n` fail with a query error.
    pub fn fail_inserts_after(&self, n: usize) {
        if let Ok(mut left) = self.inserts_left.lock() {
            *left = Some(n);
        }
    }

    /// Simulate a lost database connection for every operation.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, AtomicOrdering::SeqCst);
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock()
            .map(|tables| tables.get(table).map(|t| t.rows.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<&'static str, Table>>, DatabaseError> {
        if self.unavailable.load(AtomicOrdering::SeqCst) {
            return Err(DatabaseError::Connection("memory store unavailable".to_string()));
        }
        self.tables
            .lock()
            .map_err(|_| DatabaseError::QueryError("memory store poisoned".to_string()))
    }

    fn check_insert_budget(&self) -> Result<(), DatabaseError> {
        let mut left = self
            .inserts_left
            .lock()
            .map_err(|_| DatabaseError::QueryError("memory store poisoned".to_string()))?;
        match left.as_mut() {
            Some(0) => Err(DatabaseError::QueryError("injected insert failure".to_string())),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn matches(row: &Record, filter: &Filter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|c| row.get(c.column).unwrap_or(&Value::Null) == &c.data)
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn sort_rows(rows: &mut [Record], filter: &Filter) {
    let order = filter.order_info();
    rows.sort_by(|a, b| {
        let a = a.get(order.column).unwrap_or(&Value::Null);
        let b = b.get(order.column).unwrap_or(&Value::Null);
        // NULL sorts as larger than any value
        let ord = match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare(a, b),
        };
        match order.sort {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

fn unique_conflict(
    entity: &EntityDescriptor,
    table: &Table,
    candidate: &Record,
    skip_id: Option<i64>,
) -> Option<String> {
    entity.unique_columns().find_map(|column| {
        let value = candidate.get(column.name).filter(|v| !v.is_null())?;
        table
            .rows
            .iter()
            .filter(|row| skip_id.is_none() || record::record_id(row) != skip_id)
            .any(|row| row.get(column.name) == Some(value))
            .then(|| format!("duplicate key value violates unique constraint on \"{}\"", column.name))
    })
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn insert(
        &self,
        entity: &'static EntityDescriptor,
        mut row: Record,
    ) -> Result<Record, DatabaseError> {
        let mut tables = self.lock()?;
        self.check_insert_budget()?;
        let table = tables.entry(entity.name).or_default();

        if let Some(msg) = unique_conflict(entity, table, &row, None) {
            return Err(DatabaseError::UniqueViolation(msg));
        }

        table.last_id += 1;
        row.insert("id".to_string(), Value::from(table.last_id));
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn select(&self, filter: &Filter) -> Result<Vec<Record>, DatabaseError> {
        let tables = self.lock()?;
        let Some(table) = tables.get(filter.entity().name) else {
            return Ok(vec![]);
        };

        let mut rows: Vec<Record> = table.rows.iter().filter(|r| matches(r, filter)).cloned().collect();
        sort_rows(&mut rows, filter);

        let offset = filter.offset_value().unwrap_or(0).max(0) as usize;
        let limit = filter.limit_value().map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        let tables = self.lock()?;
        Ok(tables
            .get(filter.entity().name)
            .map(|t| t.rows.iter().filter(|r| matches(r, filter)).count() as i64)
            .unwrap_or(0))
    }

    async fn update(&self, filter: &Filter, changes: Record) -> Result<Option<Record>, DatabaseError> {
        let entity = filter.entity();
        let mut tables = self.lock()?;
        let Some(table) = tables.get_mut(entity.name) else {
            return Ok(None);
        };
        let Some(index) = table.rows.iter().position(|r| matches(r, filter)) else {
            return Ok(None);
        };

        let mut updated = table.rows[index].clone();
        for (key, value) in changes {
            if key != "id" && key != "user_id" {
                updated.insert(key, value);
            }
        }
        if let Some(msg) = unique_conflict(entity, table, &updated, record::record_id(&updated)) {
            return Err(DatabaseError::UniqueViolation(msg));
        }

        table.rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, filter: &Filter) -> Result<bool, DatabaseError> {
        let mut tables = self.lock()?;
        let Some(table) = tables.get_mut(filter.entity().name) else {
            return Ok(false);
        };
        match table.rows.iter().position(|r| matches(r, filter)) {
            Some(index) => {
                table.rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_all(&self, filters: &[Filter]) -> Result<u64, DatabaseError> {
        let mut tables = self.lock()?;
        let mut deleted = 0;
        for filter in filters {
            if let Some(table) = tables.get_mut(filter.entity().name) {
                let before = table.rows.len();
                table.rows.retain(|r| !matches(r, filter));
                deleted += (before - table.rows.len()) as u64;
            }
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.lock().map(|_| ())
    }
}

/// Router wired to a fresh in-memory store.
pub fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (app(AppState::new(store.clone())), store)
}

pub fn bearer(user_id: &str) -> String {
    let token = generate_jwt(&Claims::new(user_id)).expect("test token");
    format!("Bearer {}", token)
}

pub fn request(method: &str, uri: &str, user_id: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header("authorization", bearer(user_id));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Drive one request through the router and decode the JSON body
/// (`Value::Null` for an empty body).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}
