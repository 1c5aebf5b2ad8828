use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::database::store::EntityStore;
use crate::entity::{find_entity, registry, ColumnType, EntityDescriptor, Record};
use crate::filter::{Filter, SortDirection};

use super::entity_service::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub data_type: &'static str,
    pub nullable: bool,
    pub default: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableData {
    pub table: &'static str,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub data: Vec<Record>,
}

/// `information_schema.columns.data_type` spelling of a column type.
fn data_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer => "integer",
        ColumnType::Float => "double precision",
        ColumnType::Text => "text",
        ColumnType::Timestamp => "timestamp with time zone",
    }
}

/// Read-only inspection of the registered tables. Table names are only ever
/// resolved through the registry.
#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn EntityStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn tables(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = registry().iter().map(|e| e.name).collect();
        names.sort_unstable();
        names
    }

    fn table(&self, name: &str) -> ServiceResult<&'static EntityDescriptor> {
        find_entity(name).ok_or_else(|| ServiceError::NotFound(format!("Table {}", name)))
    }

    pub fn schema(&self, name: &str) -> ServiceResult<Value> {
        let entity = self.table(name)?;
        let columns: Vec<ColumnInfo> = entity
            .all_columns()
            .map(|column| ColumnInfo {
                name: column.name,
                data_type: data_type(column.column_type),
                nullable: !column.required,
                default: (column.name == "id").then(|| format!("nextval('{}_id_seq'::regclass)", entity.name)),
            })
            .collect();
        Ok(json!({ "table": entity.name, "columns": columns }))
    }

    pub async fn data(&self, name: &str, limit: i64, offset: i64) -> ServiceResult<TableData> {
        let entity = self.table(name)?;
        let filter = Filter::new(entity)
            .order_by_id(SortDirection::Asc)
            .limit(limit, Some(offset))?;

        let total = self.store.count(&filter).await?;
        let data = self.store.select(&filter).await?;
        Ok(TableData {
            table: entity.name,
            total,
            limit,
            offset,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::EntityService;
    use crate::testing::MemoryStore;

    #[test]
    fn tables_are_sorted_registry_names() {
        let admin = AdminService::new(Arc::new(MemoryStore::new()));
        let tables = admin.tables();
        assert_eq!(tables.len(), registry().len());
        assert_eq!(tables.first(), Some(&"active_caves_data"));
        assert!(tables.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn schema_lists_system_columns_first() {
        let admin = AdminService::new(Arc::new(MemoryStore::new()));
        let schema = admin.schema("regional_revenue_data").unwrap();
        assert_eq!(
            schema["columns"],
            json!([
                { "name": "id", "type": "integer", "nullable": false, "default": "nextval('regional_revenue_data_id_seq'::regclass)" },
                { "name": "user_id", "type": "text", "nullable": false, "default": null },
                { "name": "anno", "type": "integer", "nullable": false, "default": null },
                { "name": "importo_euro", "type": "double precision", "nullable": false, "default": null },
            ])
        );
        assert!(matches!(admin.schema("pg_user"), Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn data_is_unscoped_and_paginated() {
        let store = Arc::new(MemoryStore::new());
        let revenue = EntityService::new(&registry::REGIONAL_REVENUE_DATA, store.clone());
        for (user, anno) in [("u1", 2021), ("u2", 2022), ("u1", 2023)] {
            revenue
                .create(&json!({ "anno": anno, "importo_euro": 1000.0 }), user)
                .await
                .unwrap();
        }

        let admin = AdminService::new(store);
        let page = admin.data("regional_revenue_data", 2, 1).await.unwrap();
        assert_eq!(page.total, 3);
        let years: Vec<_> = page.data.iter().map(|r| r["anno"].clone()).collect();
        assert_eq!(years, vec![json!(2022), json!(2023)]);
    }
}
