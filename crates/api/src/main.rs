use anyhow::Context;

use dealership_infra::AppConfig;
use dealership_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging comes up before config so config warnings are visible.
    let log_format: LogFormat = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default();
    dealership_observability::init(log_format);

    let config = AppConfig::from_env()?;

    let app = dealership_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        policy = ?config.deal_policy,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
