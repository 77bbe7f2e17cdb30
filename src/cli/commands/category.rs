use anyhow::Context;
use clap::Subcommand;
use std::sync::Arc;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::Store;

#[derive(Subcommand)]
pub enum CategoryCommands {
    #[command(about = "List global categories")]
    List,
}

pub async fn handle(cmd: CategoryCommands, store: Arc<dyn Store>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CategoryCommands::List => {
            let categories = store.list_categories().await.context("failed to list categories")?;

            if categories.is_empty() {
                return output_empty_collection(output_format, "categories", "No categories defined");
            }

            match output_format {
                OutputFormat::Json => output_collection("categories", &categories)?,
                OutputFormat::Text => {
                    println!("{:<38} {:<24} {:<9} {}", "ID", "NAME", "TYPE", "IMAGE");
                    println!("{}", "-".repeat(100));

                    for category in &categories {
                        println!(
                            "{:<38} {:<24} {:<9} {}",
                            category.id,
                            category.name,
                            category.kind.as_str(),
                            category.image
                        );
                    }
                }
            }

            Ok(())
        }
    }
}
