use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;

use crate::database::store::EntityStore;
use crate::entity::{record, registry, EntityDescriptor, Record};
use crate::filter::{Filter, SortDirection};

use super::entity_service::ServiceResult;

/// The four per-user lookup lists behind `/api/v1/config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLookup {
    Provinces,
    Materials,
    PriceMaterials,
    ForeignDestinations,
}

impl ConfigLookup {
    pub const ALL: [ConfigLookup; 4] = [
        ConfigLookup::Provinces,
        ConfigLookup::Materials,
        ConfigLookup::PriceMaterials,
        ConfigLookup::ForeignDestinations,
    ];

    /// Path segment under `/api/v1/config/`.
    pub fn path(&self) -> &'static str {
        match self {
            ConfigLookup::Provinces => "provinces",
            ConfigLookup::Materials => "materials",
            ConfigLookup::PriceMaterials => "price-materials",
            ConfigLookup::ForeignDestinations => "foreign-destinations",
        }
    }

    /// Key wrapping the list in GET responses.
    pub fn collection_key(&self) -> &'static str {
        match self {
            ConfigLookup::Provinces => "provinces",
            ConfigLookup::Materials => "materials",
            ConfigLookup::PriceMaterials => "price_materials",
            ConfigLookup::ForeignDestinations => "destinations",
        }
    }

    pub fn entity(&self) -> &'static EntityDescriptor {
        match self {
            ConfigLookup::Provinces => &registry::CONFIG_PROVINCES,
            ConfigLookup::Materials => &registry::CONFIG_MATERIALS,
            ConfigLookup::PriceMaterials => &registry::CONFIG_PRICE_MATERIALS,
            ConfigLookup::ForeignDestinations => &registry::CONFIG_FOREIGN_DESTINATIONS,
        }
    }

    /// Columns exposed in responses.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            ConfigLookup::Provinces => &["id", "code", "name"],
            ConfigLookup::Materials => &["id", "name"],
            ConfigLookup::PriceMaterials => &["id", "name", "general_material"],
            ConfigLookup::ForeignDestinations => &["id", "country"],
        }
    }

    fn project(&self, row: &Record) -> Value {
        let mut out = Map::new();
        for field in self.fields() {
            out.insert(field.to_string(), row.get(*field).cloned().unwrap_or(Value::Null));
        }
        Value::Object(out)
    }
}

#[derive(Clone)]
pub struct ConfigService {
    lookup: ConfigLookup,
    store: Arc<dyn EntityStore>,
}

impl ConfigService {
    pub fn new(lookup: ConfigLookup, store: Arc<dyn EntityStore>) -> Self {
        Self { lookup, store }
    }

    pub fn lookup(&self) -> ConfigLookup {
        self.lookup
    }

    /// All of the caller's entries, oldest first.
    pub async fn list(&self, user_id: &str) -> ServiceResult<Vec<Value>> {
        let filter = Filter::new(self.lookup.entity())
            .owner(Some(user_id))
            .order_by_id(SortDirection::Asc);
        let rows = self.store.select(&filter).await?;
        Ok(rows.iter().map(|row| self.lookup.project(row)).collect())
    }

    pub async fn create(&self, payload: &Value, user_id: &str) -> ServiceResult<Value> {
        let entity = self.lookup.entity();
        let mut row = record::for_create(entity, payload, user_id)?;
        row.insert("created_at".to_string(), Value::String(Utc::now().to_rfc3339()));

        let created = self.store.insert(entity, row).await?;
        info!("{} entry created by {}", entity.name, user_id);
        Ok(self.lookup.project(&created))
    }

    /// Delete the caller's entry; missing or foreign ids are a no-op.
    pub async fn delete(&self, id: i64, user_id: &str) -> ServiceResult<()> {
        let filter = Filter::new(self.lookup.entity()).id(id).owner(Some(user_id));
        if self.store.delete(&filter).await? {
            info!("{} {} deleted by {}", self.lookup.entity().name, id, user_id);
        }
        Ok(())
    }
}
