use anyhow::Context;
use agrocast_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads `.env` first so RUST_LOG and AGROCAST_LOG_FORMAT from it apply.
    let config = AppConfig::from_env();
    agrocast_observability::init();
    let config = config.context("invalid configuration")?;

    let services = agrocast_api::app::services::build_services(&config).await?;
    let app = agrocast_api::app::build_app(services);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
