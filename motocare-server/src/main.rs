//! motocare-server: HTTP API for branch POS, inventory and service tickets

use std::net::SocketAddr;

use motocare_server::logger::{LogOptions, SERVER_FILTER, init_logger};
use motocare_server::{AppState, BoxError, Config, api};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    init_logger(LogOptions {
        default_filter: SERVER_FILTER,
        json: config.log_json,
        log_dir: config.log_dir.as_deref(),
        file_prefix: "motocare-server",
    });

    tracing::info!(
        "Starting motocare-server {} (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    // Connects and runs pending migrations
    let state = AppState::new(&config).await?;

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup();
        }
    });

    let app = api::build_app(state, config.cors_allow_origin.as_deref());

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("motocare-server HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("motocare-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
