use chrono::{TimeZone, Utc};
use clap::Subcommand;
use serde_json::{json, Value};

use crate::auth::{self, CredentialStatus};
use crate::cli::utils::{output_error, output_fields};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Decode a credential's payload and report its expiry")]
    Decode {
        #[arg(help = "Compact three-segment token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Decode { token } => {
            let secret = config::config().gate.jwt_secret.as_deref();
            match auth::inspect(&token, Utc::now().timestamp(), secret) {
                CredentialStatus::Malformed(err) => {
                    output_error(&output_format, &err.to_string(), Some("MALFORMED_CREDENTIAL"))?;
                    Err(anyhow::anyhow!("credential could not be decoded"))
                }
                status => output_fields(&output_format, describe(&status)),
            }
        }
    }
}

/// Summary used by `token decode` and `session status`
pub fn describe(status: &CredentialStatus) -> Value {
    match status {
        CredentialStatus::Valid(claims) | CredentialStatus::Expired(claims) => json!({
            "status": if status.is_valid() { "valid" } else { "expired" },
            "subject": claims.sub,
            "expires_at": Utc.timestamp_opt(claims.exp, 0).single().map(|at| at.to_rfc3339()),
            "payload": claims.payload,
        }),
        CredentialStatus::Malformed(err) => json!({
            "status": "malformed",
            "reason": err.to_string(),
        }),
    }
}
