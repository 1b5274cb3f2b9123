use clap::Subcommand;
use serde_json::{json, Value};

use crate::auth::Role;
use crate::cli::utils::output_fields;
use crate::cli::OutputFormat;
use crate::config;
use crate::gate::{allowed_prefixes, is_path_allowed};

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Report whether a role may open a path")]
    Check {
        #[arg(help = "Role name (partnerSupplier, professional, loveDecoration)")]
        role: Role,
        #[arg(help = "Page path, e.g. /workshops/123")]
        path: String,
    },

    #[command(about = "List the path prefixes each role may open")]
    List {
        #[arg(help = "Limit the listing to one role")]
        role: Option<Role>,
    },
}

pub async fn handle(cmd: RouteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::Check { role, path } => {
            let landing = &config::config().gate.landing_path;
            output_fields(&output_format, access_report(role, &path, landing))
        }
        RouteCommands::List { role } => {
            let roles: Vec<Role> = match role {
                Some(role) => vec![role],
                None => Role::ALL.to_vec(),
            };

            let mut listing = serde_json::Map::new();
            for role in roles {
                listing.insert(role.as_str().to_string(), json!(allowed_prefixes(role)));
            }
            output_fields(&output_format, listing.into())
        }
    }
}

fn access_report(role: Role, path: &str, landing: &str) -> Value {
    let allowed = is_path_allowed(role, path);
    json!({
        "role": role.as_str(),
        "path": path,
        "allowed": allowed,
        "redirect": if allowed { None } else { Some(landing) },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_names_landing_only_when_denied() {
        let report = access_report(Role::Professional, "/workshops/12", "/mural");
        assert_eq!(report["allowed"], true);
        assert_eq!(report["redirect"], Value::Null);

        let report = access_report(Role::Professional, "/communities", "/mural");
        assert_eq!(report["role"], "professional");
        assert_eq!(report["allowed"], false);
        assert_eq!(report["redirect"], "/mural");
    }
}
