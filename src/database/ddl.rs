//! Table creation from entity descriptors.

use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::entity::{registry, EntityDescriptor};

/// `CREATE TABLE IF NOT EXISTS` plus the ownership index for one entity.
pub fn create_table_statements(entity: &EntityDescriptor) -> Vec<String> {
    let mut ddl = format!("CREATE TABLE IF NOT EXISTS \"{}\" (\n", entity.name);

    // System fields
    ddl += "    \"id\" SERIAL PRIMARY KEY,\n";
    ddl += "    \"user_id\" TEXT NOT NULL";

    for column in entity.columns {
        let nullable = if column.required { " NOT NULL" } else { "" };
        let unique = if column.unique { " UNIQUE" } else { "" };
        ddl += &format!(
            ",\n    \"{}\" {}{}{}",
            column.name,
            column.column_type.pg_type(),
            nullable,
            unique
        );
    }
    ddl += "\n)";

    let index = format!(
        "CREATE INDEX IF NOT EXISTS \"ix_{0}_user_id\" ON \"{0}\" (\"user_id\")",
        entity.name
    );

    vec![ddl, index]
}

/// Create every registered table that does not exist yet.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    for entity in registry() {
        for statement in create_table_statements(entity) {
            sqlx::query(&statement)
                .execute(pool)
                .await
                .map_err(|e| DatabaseError::QueryError(format!("Failed to create table {}: {}", entity.name, e)))?;
        }
        info!("Ensured table '{}'", entity.name);
    }
    Ok(())
}
