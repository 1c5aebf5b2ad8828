pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "quarry-stats-api")]
#[command(about = "Quarry statistics API - HTTP server and maintenance commands")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides API_PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Create any missing tables and indexes")]
    Migrate,

    #[command(about = "Issue a bearer token for a user id")]
    Token {
        #[arg(long, help = "User id to place in the token subject")]
        user: String,
        #[arg(long, help = "Token lifetime in hours")]
        hours: Option<i64>,
    },

    #[command(about = "List the registered entities and their columns")]
    Entities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token { user, hours } => commands::token::handle(&user, hours, output_format),
        Commands::Entities => commands::entities::handle(output_format),
    }
}
