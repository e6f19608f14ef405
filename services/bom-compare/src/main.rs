use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use bomdiff_service::create_app;
use bomdiff_utils::{init_logging, validate_model, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load_or_default();
    validate_model(&config).context("Invalid configuration")?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting BOM comparison service");

    // Build application router
    let app = create_app(&config);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("BOM comparison service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
