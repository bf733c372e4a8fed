use std::sync::Arc;

use anyhow::Context;

use cartview_api::app::{build_app, services::AppServices};
use cartview_infra::{config::AppConfig, db};
use cartview_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cartview_observability::init(LogFormat::from_env()?);

    let config = AppConfig::from_env()?;
    let services = Arc::new(AppServices::from_config(&config).await?);
    let pool = services.pool().cloned();

    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        db::disconnect(pool).await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
