use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::{Role, UserSummary};
use crate::database::Store;
use crate::services::user_service::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List all users")]
    List,

    #[command(about = "Grant the admin role")]
    Promote {
        #[arg(help = "Email of the account")]
        email: String,
    },

    #[command(about = "Revoke the admin role")]
    Demote {
        #[arg(help = "Email of the account")]
        email: String,
    },
}

pub async fn handle(cmd: UserCommands, store: Arc<dyn Store>, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::List => {
            let users = store.list_users().await.context("failed to list users")?;

            if users.is_empty() {
                return output_empty_collection(output_format, "users", "No users registered");
            }

            match output_format {
                OutputFormat::Json => {
                    let users: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
                    output_collection("users", &users)?;
                }
                OutputFormat::Text => {
                    println!("{:<38} {:<20} {:<30} {:<6} {}", "ID", "USERNAME", "EMAIL", "ROLE", "CREATED");
                    println!("{}", "-".repeat(112));

                    for user in &users {
                        println!(
                            "{:<38} {:<20} {:<30} {:<6} {}",
                            user.id,
                            user.username,
                            user.email,
                            user.role.as_str(),
                            user.created_at.format("%Y-%m-%d %H:%M")
                        );
                    }
                }
            }

            Ok(())
        }
        UserCommands::Promote { email } => set_role(store, &email, Role::Admin, output_format).await,
        UserCommands::Demote { email } => set_role(store, &email, Role::User, output_format).await,
    }
}

async fn set_role(store: Arc<dyn Store>, email: &str, role: Role, output_format: OutputFormat) -> anyhow::Result<()> {
    let user = store
        .find_user_by_email(email)
        .await
        .context("failed to look up user")?
        .ok_or_else(|| anyhow!("no user with email '{}'", email))?;

    let user = UserService::new(store)
        .set_role(user.id, role)
        .await
        .map_err(|e| anyhow!("failed to change role: {}", e))?;

    output_success(
        output_format,
        &format!("{} is now {}", user.username, role.as_str()),
        Some(json!({ "user": UserSummary::from(&user) })),
    )
}
