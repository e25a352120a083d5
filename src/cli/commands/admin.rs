use clap::Subcommand;
use serde_json::json;

use crate::auth::{hash_password, validate_password_strength};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::models::NewUser;
use crate::database::UserStore;
use crate::types::Role;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Registration only creates USER accounts; this is how SUPER_ADMINs are made
    #[command(about = "Create a SUPER_ADMIN account")]
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "COURTSIDE_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create {
            email,
            name,
            password,
        } => {
            let password = password
                .ok_or_else(|| anyhow::anyhow!("--password or COURTSIDE_ADMIN_PASSWORD is required"))?;
            validate_password_strength(&password)?;

            let store = super::pg_store().await?;
            let password_hash = hash_password(&password, config::config().security.bcrypt_cost)?;
            let user = store
                .create_user(NewUser {
                    email: email.trim().to_lowercase(),
                    name,
                    password_hash,
                    phone: None,
                    city: None,
                    role: Role::SuperAdmin,
                })
                .await?;

            output_success(
                &output_format,
                &format!("Created super admin {}", user.email),
                Some(json!({ "id": user.id, "email": user.email })),
            )
        }
    }
}
