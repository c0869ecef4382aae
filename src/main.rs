use anyhow::Context;

use flowbridge::config::AppConfig;
use flowbridge::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    // A paid model under free-only mode stops startup here.
    let app = routes::build(&config)?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        port = config.port,
        backend = %config.llm.backend,
        fast_model = %config.fast_model,
        quality_model = %config.quality_model,
        "FlowBridge is running"
    );
    tracing::info!("Health check: http://localhost:{}/health", config.port);
    tracing::info!("Webhooks ready: http://localhost:{}/webhooks", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
