pub mod admin_service;
pub mod config_service;
pub mod entity_service;
pub mod reset_service;

pub use admin_service::AdminService;
pub use config_service::{ConfigLookup, ConfigService};
pub use entity_service::{
    BatchUpdateItem, EntityService, ListParams, ListResult, ServiceError, ServiceResult,
};
pub use reset_service::ResetService;
