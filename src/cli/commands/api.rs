use std::sync::Arc;

use clap::Subcommand;
use reqwest::Method;
use serde_json::Value;

use crate::cli::config::session_store;
use crate::cli::OutputFormat;
use crate::client::{ApiClient, LogNavigator};
use crate::config::{self, ClientConfig};

#[derive(Subcommand)]
pub enum ApiCommands {
    #[command(about = "GET a backend path")]
    Get {
        #[arg(help = "Path relative to the API base URL")]
        path: String,
    },

    #[command(about = "DELETE a backend path")]
    Delete { path: String },

    #[command(about = "POST a JSON body")]
    Post {
        path: String,
        #[arg(help = "JSON request body")]
        body: String,
    },

    #[command(about = "PUT a JSON body")]
    Put { path: String, body: String },

    #[command(about = "PATCH a JSON body")]
    Patch { path: String, body: String },
}

impl ApiCommands {
    fn into_parts(self) -> anyhow::Result<(Method, String, Option<Value>)> {
        let parse = |body: String| -> anyhow::Result<Option<Value>> {
            serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| anyhow::anyhow!("request body is not valid JSON: {}", e))
        };

        Ok(match self {
            ApiCommands::Get { path } => (Method::GET, path, None),
            ApiCommands::Delete { path } => (Method::DELETE, path, None),
            ApiCommands::Post { path, body } => (Method::POST, path, parse(body)?),
            ApiCommands::Put { path, body } => (Method::PUT, path, parse(body)?),
            ApiCommands::Patch { path, body } => (Method::PATCH, path, parse(body)?),
        })
    }
}

pub async fn handle(cmd: ApiCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (method, path, body) = cmd.into_parts()?;

    // The process exits right after a 401, so the login notice cannot wait
    let app = config::config();
    let client_config = ClientConfig {
        redirect_delay_ms: 0,
        ..app.client.clone()
    };
    let client = ApiClient::new(
        &client_config,
        app.gate.login_path.clone(),
        Arc::new(session_store()?),
        Arc::new(LogNavigator),
    )?;
    let mut request = client.request(method, &path)?;
    if let Some(body) = body {
        request = request.json(&body);
    }

    match client.send(request).await {
        Ok(response) => {
            let text = response.text().await?;
            match serde_json::from_str::<Value>(&text) {
                Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
                Err(_) => println!("{}", text),
            }
            Ok(())
        }
        Err(err) => {
            // Text mode leaves the message to the binary's error handler
            if let OutputFormat::Json = output_format {
                println!("{}", serde_json::to_string_pretty(&err.to_json())?);
            }
            Err(err.into())
        }
    }
}
