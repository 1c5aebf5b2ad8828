use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::database::store::EntityStore;
use crate::entity::{registry, EntityDescriptor};
use crate::filter::Filter;

use super::entity_service::{ServiceError, ServiceResult};

/// Tables cleared when a chapter is reset for one year.
pub fn chapter_tables(chapter: &str) -> Option<&'static [&'static EntityDescriptor]> {
    static CAVE_AUTORIZZATE: [&EntityDescriptor; 3] = [
        &registry::ANNUAL_CAVE_DATA,
        &registry::CAVE_DETAILS,
        &registry::PROVINCE_MATERIAL_DATA,
    ];
    static CAVE_ATTIVE: [&EntityDescriptor; 1] = [&registry::ACTIVE_CAVES_DATA];
    static ESTRAZIONI: [&EntityDescriptor; 1] = [&registry::EXTRACTION_DATA];
    static VENDITE: [&EntityDescriptor; 1] = [&registry::SALES_DATA];
    static DATI_ECONOMICI: [&EntityDescriptor; 1] = [&registry::ECONOMIC_DATA];
    static OCCUPAZIONE: [&EntityDescriptor; 1] = [&registry::EMPLOYMENT_DATA];
    static PREZZI: [&EntityDescriptor; 1] = [&registry::PRICE_DATA];
    static DESTINAZIONI: [&EntityDescriptor; 1] = [&registry::DESTINATION_DATA];
    static CONCORRENTI: [&EntityDescriptor; 1] = [&registry::COMPETITOR_DATA];

    let tables: &'static [&'static EntityDescriptor] = match chapter {
        "cave_autorizzate" => &CAVE_AUTORIZZATE,
        "cave_attive" => &CAVE_ATTIVE,
        "estrazioni" => &ESTRAZIONI,
        "vendite" => &VENDITE,
        "dati_economici" => &DATI_ECONOMICI,
        "occupazione" => &OCCUPAZIONE,
        "prezzi" => &PREZZI,
        "destinazioni" => &DESTINAZIONI,
        "concorrenti" => &CONCORRENTI,
        _ => return None,
    };
    Some(tables)
}

#[derive(Clone)]
pub struct ResetService {
    store: Arc<dyn EntityStore>,
}

impl ResetService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Delete the caller's rows for `anno` from every table of `chapter`,
    /// all in one unit of work. Returns the number of rows removed.
    pub async fn reset_chapter(&self, chapter: &str, anno: i64, user_id: &str) -> ServiceResult<u64> {
        let tables = chapter_tables(chapter).ok_or_else(|| ServiceError::Validation("Invalid chapter".to_string()))?;

        let filters = tables
            .iter()
            .map(|&entity| {
                Filter::new(entity)
                    .owner(Some(user_id))
                    .where_field("anno", &Value::from(anno))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let deleted = self.store.delete_all(&filters).await?;
        info!(
            "Reset chapter '{}' year {} for {}: {} rows deleted",
            chapter, anno, user_id, deleted
        );
        Ok(deleted)
    }

    /// Remove every authorized-caves-by-province row, regardless of owner.
    pub async fn reset_cave_autorizzate(&self, user_id: &str) -> ServiceResult<u64> {
        let filters = [Filter::new(&registry::PROVINCE_MATERIAL_DATA)];
        let deleted = self.store.delete_all(&filters).await?;
        info!(
            "Admin {} deleted {} records from province_material_data",
            user_id, deleted
        );
        Ok(deleted)
    }
}
