use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::entity::{EntityDescriptor, Record};
use crate::filter::Filter;

/// Persistence primitives shared by every entity.
///
/// Each mutating call is one unit of work: it either commits fully or rolls
/// back before returning the error.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a prepared row and return it as stored, including `id`.
    async fn insert(
        &self,
        entity: &'static EntityDescriptor,
        record: Record,
    ) -> Result<Record, DatabaseError>;

    /// Rows matching the filter, honouring its order and pagination.
    async fn select(&self, filter: &Filter) -> Result<Vec<Record>, DatabaseError>;

    /// Number of rows matching the filter conditions, ignoring pagination.
    async fn count(&self, filter: &Filter) -> Result<i64, DatabaseError>;

    /// Locate the first row matching `filter` and apply `changes` to it.
    /// `Ok(None)` when nothing matches. Empty `changes` returns the row as is.
    async fn update(&self, filter: &Filter, changes: Record) -> Result<Option<Record>, DatabaseError>;

    /// Delete the first row matching `filter`; `false` when nothing matches.
    async fn delete(&self, filter: &Filter) -> Result<bool, DatabaseError>;

    /// Delete every row matching each filter within a single unit of work.
    async fn delete_all(&self, filters: &[Filter]) -> Result<u64, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
