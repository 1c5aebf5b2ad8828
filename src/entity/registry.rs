use super::{ColumnDef, ColumnType, EntityDescriptor};

use ColumnType::{Float, Integer, Text, Timestamp};

const CREATED_AT: ColumnDef = ColumnDef::optional("created_at", Timestamp);
const UPDATED_AT: ColumnDef = ColumnDef::optional("updated_at", Timestamp);
const ANNO: ColumnDef = ColumnDef::required("anno", Integer);
const PROVINCIA: ColumnDef = ColumnDef::required("provincia", Text);
const MATERIALE: ColumnDef = ColumnDef::required("materiale", Text);

pub static ANNUAL_CAVE_DATA: EntityDescriptor = EntityDescriptor {
    name: "annual_cave_data",
    label: "Annual_cave_data",
    columns: &[
        ANNO,
        ColumnDef::required("numero_cave", Integer),
        CREATED_AT,
        UPDATED_AT,
    ],
};

/// Authorized quarries per province and material ("cave autorizzate").
pub static PROVINCE_MATERIAL_DATA: EntityDescriptor = EntityDescriptor {
    name: "province_material_data",
    label: "Province_material_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("numero_cave", Integer),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static CAVE_DETAILS: EntityDescriptor = EntityDescriptor {
    name: "cave_details",
    label: "Cave_details",
    columns: &[
        ANNO,
        ColumnDef::optional("numero_fascicolo", Text),
        ColumnDef::optional("azienda", Text),
        ColumnDef::optional("localita", Text),
        ColumnDef::optional("comune", Text),
        ColumnDef::optional("provincia", Text),
        ColumnDef::optional("dati_catastali", Text),
        ColumnDef::optional("stato_cava", Text),
        ColumnDef::optional("aperta_fino_al", Integer),
        ColumnDef::optional("materiale", Text),
        ColumnDef::optional("numero_decreto", Text),
        ColumnDef::optional("data_decreto", Text),
        ColumnDef::optional("scadenza_autorizzazione", Text),
        CREATED_AT,
    ],
};

pub static ACTIVE_CAVES_DATA: EntityDescriptor = EntityDescriptor {
    name: "active_caves_data",
    label: "Active_caves_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("numero_cave", Integer),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static EXTRACTION_DATA: EntityDescriptor = EntityDescriptor {
    name: "extraction_data",
    label: "Extraction_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("volume_m3", Float),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static SALES_DATA: EntityDescriptor = EntityDescriptor {
    name: "sales_data",
    label: "Sales_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("volume_m3", Float),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static PRICE_DATA: EntityDescriptor = EntityDescriptor {
    name: "price_data",
    label: "Price_data",
    columns: &[
        ANNO,
        ColumnDef::required("classe_materiale", Text),
        ColumnDef::required("prezzo_euro_m3", Float),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static ECONOMIC_DATA: EntityDescriptor = EntityDescriptor {
    name: "economic_data",
    label: "Economic_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("fatturato", Float),
        ColumnDef::required("costi", Float),
        ColumnDef::required("utile_lordo", Float),
        ColumnDef::required("utile_netto", Float),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static EMPLOYMENT_DATA: EntityDescriptor = EntityDescriptor {
    name: "employment_data",
    label: "Employment_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("numero_occupati", Integer),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static COMPETITOR_DATA: EntityDescriptor = EntityDescriptor {
    name: "competitor_data",
    label: "Competitor_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("tipo_concorrente", Text),
        ColumnDef::required("numero_concorrenti", Integer),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static DESTINATION_DATA: EntityDescriptor = EntityDescriptor {
    name: "destination_data",
    label: "Destination_data",
    columns: &[
        ANNO,
        PROVINCIA,
        MATERIALE,
        ColumnDef::required("destinazione_tipo", Text),
        ColumnDef::optional("destinazione_dettaglio", Text),
        ColumnDef::required("volume_m3", Float),
        CREATED_AT,
        UPDATED_AT,
    ],
};

pub static REGIONAL_REVENUE_DATA: EntityDescriptor = EntityDescriptor {
    name: "regional_revenue_data",
    label: "Regional_revenue_data",
    columns: &[ANNO, ColumnDef::required("importo_euro", Float)],
};

pub static CONFIG_PROVINCES: EntityDescriptor = EntityDescriptor {
    name: "config_provinces",
    label: "Config_provinces",
    columns: &[
        ColumnDef::required("code", Text).unique(),
        ColumnDef::required("name", Text),
        CREATED_AT,
    ],
};

pub static CONFIG_MATERIALS: EntityDescriptor = EntityDescriptor {
    name: "config_materials",
    label: "Config_materials",
    columns: &[ColumnDef::required("name", Text).unique(), CREATED_AT],
};

pub static CONFIG_PRICE_MATERIALS: EntityDescriptor = EntityDescriptor {
    name: "config_price_materials",
    label: "Config_price_materials",
    columns: &[
        ColumnDef::required("name", Text).unique(),
        ColumnDef::required("general_material", Text),
        CREATED_AT,
    ],
};

pub static CONFIG_FOREIGN_DESTINATIONS: EntityDescriptor = EntityDescriptor {
    name: "config_foreign_destinations",
    label: "Config_foreign_destinations",
    columns: &[ColumnDef::required("country", Text).unique(), CREATED_AT],
};

static REGISTRY: [&EntityDescriptor; 16] = [
    &ANNUAL_CAVE_DATA,
    &PROVINCE_MATERIAL_DATA,
    &CAVE_DETAILS,
    &ACTIVE_CAVES_DATA,
    &EXTRACTION_DATA,
    &SALES_DATA,
    &PRICE_DATA,
    &ECONOMIC_DATA,
    &EMPLOYMENT_DATA,
    &COMPETITOR_DATA,
    &DESTINATION_DATA,
    &REGIONAL_REVENUE_DATA,
    &CONFIG_PROVINCES,
    &CONFIG_MATERIALS,
    &CONFIG_PRICE_MATERIALS,
    &CONFIG_FOREIGN_DESTINATIONS,
];

/// Every entity exposed by the API, in route registration order.
pub fn registry() -> &'static [&'static EntityDescriptor] {
    &REGISTRY
}

pub fn find_entity(name: &str) -> Option<&'static EntityDescriptor> {
    REGISTRY.iter().copied().find(|e| e.name == name)
}
