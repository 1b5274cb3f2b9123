pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "upc")]
#[command(about = "UP Connection CLI - session, route access and backend API calls")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Store, inspect or discard the local session")]
    Session {
        #[command(subcommand)]
        cmd: commands::session::SessionCommands,
    },

    #[command(about = "Check which pages a role may open")]
    Route {
        #[command(subcommand)]
        cmd: commands::route::RouteCommands,
    },

    #[command(about = "Inspect credentials")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Call the backend API with the stored session")]
    Api {
        #[command(subcommand)]
        cmd: commands::api::ApiCommands,
    },
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

    match cli.command {
        Commands::Session { cmd } => commands::session::handle(cmd, output_format).await,
        Commands::Route { cmd } => commands::route::handle(cmd, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Api { cmd } => commands::api::handle(cmd, output_format).await,
    }
}
