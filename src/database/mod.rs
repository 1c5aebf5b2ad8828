pub mod ddl;
pub mod manager;
pub mod postgres;
pub mod query_builder;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use postgres::PgStore;
pub use store::EntityStore;
