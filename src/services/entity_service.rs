use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::database::manager::DatabaseError;
use crate::database::store::EntityStore;
use crate::entity::{record, EntityDescriptor, Record, RecordError};
use crate::filter::{Filter, FilterError, SortDirection};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Database(DatabaseError),
}

impl ServiceError {
    /// Failures confined to a single input item. Batch operations skip these
    /// and carry on with the remaining items.
    pub fn is_item_failure(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::Record(_)
                | ServiceError::Filter(_)
                | ServiceError::Validation(_)
        )
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation(msg)
            | DatabaseError::NotNullViolation(msg)
            | DatabaseError::InvalidValue(msg) => ServiceError::Validation(msg),
            other => ServiceError::Database(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// One page of a list query.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub items: Vec<Record>,
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
}

/// Parameters for `get_list`; `query` holds exact-match conditions.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub skip: i64,
    pub limit: i64,
    pub query: Option<Map<String, Value>>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchUpdateItem {
    pub id: i64,
    pub updates: Value,
}

/// CRUD operations for a single entity, optionally scoped to an owner.
///
/// Every scoped operation takes `user_id: Option<&str>`; `None` spans all
/// users and is only used by the unscoped read paths.
#[derive(Clone)]
pub struct EntityService {
    entity: &'static EntityDescriptor,
    store: Arc<dyn EntityStore>,
}

impl EntityService {
    pub fn new(entity: &'static EntityDescriptor, store: Arc<dyn EntityStore>) -> Self {
        Self { entity, store }
    }

    pub fn entity(&self) -> &'static EntityDescriptor {
        self.entity
    }

    pub fn not_found(&self) -> ServiceError {
        ServiceError::NotFound(self.entity.label.to_string())
    }

    pub async fn create(&self, payload: &Value, user_id: &str) -> ServiceResult<Record> {
        let row = record::for_create(self.entity, payload, user_id)?;
        let created = self.store.insert(self.entity, row).await?;
        info!(
            "{} created with id {:?}",
            self.entity.label,
            record::record_id(&created)
        );
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64, user_id: Option<&str>) -> ServiceResult<Option<Record>> {
        let filter = Filter::new(self.entity).id(id).owner(user_id).limit(1, None)?;
        Ok(self.store.select(&filter).await?.into_iter().next())
    }

    /// Whether `user_id` owns the row `id`. Lookup failures count as "no".
    pub async fn check_ownership(&self, id: i64, user_id: &str) -> bool {
        match self.get_by_id(id, Some(user_id)).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                error!("Ownership check failed for {} {}: {}", self.entity.name, id, e);
                false
            }
        }
    }

    pub async fn get_list(&self, params: ListParams, user_id: Option<&str>) -> ServiceResult<ListResult> {
        debug!(
            "Listing {} (skip={}, limit={}, query={:?}, sort={:?})",
            self.entity.name, params.skip, params.limit, params.query, params.sort
        );

        let mut filter = Filter::new(self.entity).owner(user_id);
        if let Some(query) = &params.query {
            filter = filter.where_clause(query)?;
        }
        let filter = filter
            .sort(params.sort.as_deref())
            .limit(params.limit, Some(params.skip))?;

        let total = self.store.count(&filter).await?;
        let items = self.store.select(&filter).await?;

        Ok(ListResult {
            items,
            total,
            skip: params.skip,
            limit: params.limit,
        })
    }

    pub async fn update(&self, id: i64, payload: &Value, user_id: Option<&str>) -> ServiceResult<Option<Record>> {
        let changes = record::for_update(self.entity, payload)?;
        let filter = Filter::new(self.entity).id(id).owner(user_id);
        let updated = self.store.update(&filter, changes).await?;
        if updated.is_some() {
            info!("{} {} updated", self.entity.label, id);
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: i64, user_id: Option<&str>) -> ServiceResult<bool> {
        let filter = Filter::new(self.entity).id(id).owner(user_id);
        let deleted = self.store.delete(&filter).await?;
        if deleted {
            info!("{} {} deleted", self.entity.label, id);
        }
        Ok(deleted)
    }

    /// First row (newest id) whose `field` equals `value`, across all owners.
    /// Unlike `get_list`, an unknown field is an error.
    pub async fn get_by_field(&self, field: &str, value: &Value) -> ServiceResult<Option<Record>> {
        let filter = Filter::new(self.entity)
            .where_field(field, value)?
            .order_by_id(SortDirection::Desc)
            .limit(1, None)?;
        Ok(self.store.select(&filter).await?.into_iter().next())
    }

    pub async fn list_by_field(
        &self,
        field: &str,
        value: &Value,
        skip: i64,
        limit: i64,
    ) -> ServiceResult<Vec<Record>> {
        let filter = Filter::new(self.entity)
            .where_field(field, value)?
            .order_by_id(SortDirection::Desc)
            .limit(limit, Some(skip))?;
        Ok(self.store.select(&filter).await?)
    }

    pub async fn batch_create(&self, items: &[Value], user_id: &str) -> ServiceResult<Vec<Record>> {
        let mut created = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.create(item, user_id).await {
                Ok(row) => created.push(row),
                Err(e) if e.is_item_failure() => {
                    debug!("Skipping {} batch item {}: {}", self.entity.name, index, e);
                }
                Err(e) => return Err(e),
            }
        }
        info!("Batch created {} {}", created.len(), self.entity.name);
        Ok(created)
    }

    pub async fn batch_update(&self, items: &[BatchUpdateItem], user_id: &str) -> ServiceResult<Vec<Record>> {
        let mut updated = Vec::with_capacity(items.len());
        for item in items {
            match self.update(item.id, &item.updates, Some(user_id)).await {
                Ok(Some(row)) => updated.push(row),
                Ok(None) => debug!("Skipping {} {}: not found", self.entity.name, item.id),
                Err(e) if e.is_item_failure() => {
                    debug!("Skipping {} {}: {}", self.entity.name, item.id, e);
                }
                Err(e) => return Err(e),
            }
        }
        info!("Batch updated {} {}", updated.len(), self.entity.name);
        Ok(updated)
    }

    pub async fn batch_delete(&self, ids: &[i64], user_id: &str) -> ServiceResult<u64> {
        let mut deleted = 0;
        for &id in ids {
            if self.delete(id, Some(user_id)).await? {
                deleted += 1;
            }
        }
        info!("Batch deleted {} {}", deleted, self.entity.name);
        Ok(deleted)
    }
}
