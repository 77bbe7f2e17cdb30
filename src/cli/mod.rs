pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::config;
use crate::database::{DatabaseManager, Store};

#[derive(Parser)]
#[command(name = "budget")]
#[command(about = "Budget CLI - Administer users and categories directly against the store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "User accounts and roles")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Global category catalog")]
    Category {
        #[command(subcommand)]
        cmd: commands::category::CategoryCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

/// Open the store named by DATABASE_URL
pub async fn open_store() -> anyhow::Result<Arc<dyn Store>> {
    let config = config();
    let store = DatabaseManager::connect(&config.database)
        .await
        .context("failed to open the store")?;
    if store.backend_name() == "memory" {
        tracing::warn!("DATABASE_URL points at the in-memory store; changes will not outlive this command");
    }
    Ok(store)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let store = open_store().await?;

    match cli.command {
        Commands::User { cmd } => commands::user::handle(cmd, store, output_format).await,
        Commands::Category { cmd } => commands::category::handle(cmd, store, output_format).await,
    }
}
