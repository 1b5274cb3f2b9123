use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{self, CredentialStatus, Role};
use crate::cli::commands::token::describe;
use crate::cli::config::session_store;
use crate::cli::utils::{output_fields, output_success};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Store a credential and role issued by the backend")]
    Login {
        #[arg(long, help = "Compact three-segment token")]
        token: String,
        #[arg(long, help = "Role name (partnerSupplier, professional, loveDecoration)")]
        role: Role,
    },

    #[command(about = "Discard the stored session")]
    Logout,

    #[command(about = "Show the stored session and whether it is still usable")]
    Status,
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = session_store()?;
    let secret = config::config().gate.jwt_secret.as_deref();

    match cmd {
        SessionCommands::Login { token, role } => {
            ensure_usable(&token, Utc::now().timestamp(), secret)?;
            store.save(token, role)?;
            output_success(
                &output_format,
                &format!("Session stored for role '{}'", role),
                Some(json!({ "role": role.as_str(), "path": store.path() })),
            )
        }
        SessionCommands::Logout => {
            store.forget()?;
            output_success(&output_format, "Session discarded", None)
        }
        SessionCommands::Status => {
            let saved = store.load()?;
            let credential = match saved.token.as_deref() {
                Some(token) => describe(&auth::inspect(token, Utc::now().timestamp(), secret)),
                None => json!({ "status": "absent" }),
            };

            output_fields(
                &output_format,
                json!({
                    "role": saved.role.map(|role| role.as_str()),
                    "saved_at": saved.saved_at,
                    "credential": credential,
                }),
            )
        }
    }
}

/// Refuse to store something the gate would reject on sight
fn ensure_usable(token: &str, now: i64, secret: Option<&str>) -> anyhow::Result<()> {
    match auth::inspect(token, now, secret) {
        CredentialStatus::Valid(_) => Ok(()),
        CredentialStatus::Expired(_) => anyhow::bail!("credential is already expired"),
        CredentialStatus::Malformed(err) => anyhow::bail!("credential rejected: {}", err),
    }
}
