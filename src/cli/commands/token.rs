use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

pub fn handle(user: &str, hours: Option<i64>, output_format: OutputFormat) -> anyhow::Result<()> {
    let claims = match hours {
        Some(hours) => Claims::with_expiry(user, hours),
        None => Claims::new(user),
    };
    let token = generate_jwt(&claims)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for {}", user),
            Some(json!({ "token": token, "expires_at": claims.exp })),
        ),
        // Bare token so the text form can be captured by scripts
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
