use alumni_server::{AppState, Config, api};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    init_tracing(config.as_ref().is_ok_and(Config::is_production));

    let config = config.inspect_err(|e| {
        tracing::error!("Invalid configuration: {e}");
    })?;

    tracing::info!(
        "Starting alumni-server (env: {}, images: {:?})",
        config.environment,
        config.image_strategy
    );

    let http_port = config.http_port;
    let state = AppState::new(config)?;

    // Connect eagerly so misconfiguration shows up in the logs at startup;
    // requests retry on their own if this fails.
    if let Err(e) = state.db.ensure_connected().await {
        tracing::warn!("Database not ready at startup: {e}");
    }

    let app = api::router(state);

    let http_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("alumni-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("alumni-server stopped");
    Ok(())
}

/// JSON lines in production, human-readable output elsewhere
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "alumni_server=info,tower_http=info".into());

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
