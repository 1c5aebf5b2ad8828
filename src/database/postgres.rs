use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::error;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::{self, QueryBuilder};
use crate::database::store::EntityStore;
use crate::entity::{EntityDescriptor, Record};
use crate::filter::Filter;

/// `EntityStore` backed by a Postgres connection pool. Every mutating call
/// runs in its own transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn rollback(tx: Transaction<'static, Postgres>, table: &str) {
        if let Err(e) = tx.rollback().await {
            error!("Rollback failed on {}: {}", table, e);
        }
    }

    /// Lock the first row matching `filter`, returning its id.
    async fn lock_first(
        tx: &mut Transaction<'static, Postgres>,
        filter: &Filter,
    ) -> Result<Option<i64>, DatabaseError> {
        let sql = filter.to_lock_sql();
        let row = query_builder::build_query(&sql).fetch_optional(&mut **tx).await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<i64, _>("id")?)),
            None => Ok(None),
        }
    }

    async fn update_in(
        tx: &mut Transaction<'static, Postgres>,
        filter: &Filter,
        changes: &Record,
    ) -> Result<Option<Record>, DatabaseError> {
        let Some(id) = Self::lock_first(tx, filter).await? else {
            return Ok(None);
        };

        let entity = filter.entity();
        let sql = if changes.is_empty() {
            Filter::new(entity).id(id).to_sql()
        } else {
            QueryBuilder::update(entity, id, changes)
        };
        query_builder::fetch_optional_record(&mut **tx, &sql).await
    }

    async fn delete_in(
        tx: &mut Transaction<'static, Postgres>,
        filter: &Filter,
    ) -> Result<bool, DatabaseError> {
        let Some(id) = Self::lock_first(tx, filter).await? else {
            return Ok(false);
        };
        let sql = Filter::new(filter.entity()).id(id).to_delete_sql();
        let affected = query_builder::execute(&mut **tx, &sql).await?;
        Ok(affected > 0)
    }

    async fn delete_all_in(
        tx: &mut Transaction<'static, Postgres>,
        filters: &[Filter],
    ) -> Result<u64, DatabaseError> {
        let mut deleted = 0;
        for filter in filters {
            deleted += query_builder::execute(&mut **tx, &filter.to_delete_sql()).await?;
        }
        Ok(deleted)
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn insert(
        &self,
        entity: &'static EntityDescriptor,
        record: Record,
    ) -> Result<Record, DatabaseError> {
        let sql = QueryBuilder::insert(entity, &record);
        let mut tx = self.pool.begin().await?;

        match query_builder::fetch_optional_record(&mut *tx, &sql).await {
            Ok(Some(row)) => {
                tx.commit().await?;
                Ok(row)
            }
            Ok(None) => {
                Self::rollback(tx, entity.name).await;
                Err(DatabaseError::QueryError(format!("insert into {} returned no row", entity.name)))
            }
            Err(e) => {
                Self::rollback(tx, entity.name).await;
                Err(e)
            }
        }
    }

    async fn select(&self, filter: &Filter) -> Result<Vec<Record>, DatabaseError> {
        query_builder::fetch_records(&self.pool, &filter.to_sql()).await
    }

    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError> {
        query_builder::fetch_count(&self.pool, &filter.to_count_sql()).await
    }

    async fn update(&self, filter: &Filter, changes: Record) -> Result<Option<Record>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        match Self::update_in(&mut tx, filter, &changes).await {
            Ok(row) => {
                tx.commit().await?;
                Ok(row)
            }
            Err(e) => {
                Self::rollback(tx, filter.entity().name).await;
                Err(e)
            }
        }
    }

    async fn delete(&self, filter: &Filter) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        match Self::delete_in(&mut tx, filter).await {
            Ok(deleted) => {
                tx.commit().await?;
                Ok(deleted)
            }
            Err(e) => {
                Self::rollback(tx, filter.entity().name).await;
                Err(e)
            }
        }
    }

    async fn delete_all(&self, filters: &[Filter]) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        match Self::delete_all_in(&mut tx, filters).await {
            Ok(deleted) => {
                tx.commit().await?;
                Ok(deleted)
            }
            Err(e) => {
                let tables: Vec<_> = filters.iter().map(|f| f.entity().name).collect();
                Self::rollback(tx, &tables.join(",")).await;
                Err(e)
            }
        }
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
