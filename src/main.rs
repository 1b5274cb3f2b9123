use tracing_subscriber::EnvFilter;

use up_connection::{config, is_production, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up UPC_API_BASE_URL, GATE_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting UP Connection gate in {:?} mode", config.environment);

    if config.gate.jwt_secret.is_none() {
        if is_production!() {
            tracing::warn!("GATE_JWT_SECRET not set: the gate checks expiry only, not token signatures");
        } else {
            tracing::debug!("Gate running without signature verification");
        }
    }

    let app = server::app(config);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!(
        "Gate listening on http://{} serving {}",
        bind_addr,
        config.server.static_dir
    );

    axum::serve(listener, app).await?;
    Ok(())
}
