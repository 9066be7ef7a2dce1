use anyhow::Context;

use inventorix_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    inventorix_observability::init(inventorix_observability::tracing::DEFAULT_DIRECTIVE);

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting");

    let services = app::services::build_services(&config).await?;
    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
