use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{ddl, DatabaseManager};
use crate::entity::registry;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database).await?;
    ddl::migrate(&pool).await?;

    output_success(
        &output_format,
        &format!("{} tables are up to date", registry().len()),
        None,
    )
}
