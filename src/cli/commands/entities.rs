use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::entity::registry;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let entities: Vec<Value> = registry()
                .iter()
                .map(|entity| {
                    json!({
                        "name": entity.name,
                        "label": entity.label,
                        "columns": entity.all_columns().map(|c| c.name).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entities)?);
        }
        OutputFormat::Text => {
            for entity in registry() {
                let columns: Vec<_> = entity
                    .all_columns()
                    .map(|c| {
                        if c.required {
                            format!("{}*", c.name)
                        } else {
                            c.name.to_string()
                        }
                    })
                    .collect();
                println!("{:<28} {}", entity.name, columns.join(", "));
            }
        }
    }
    Ok(())
}
