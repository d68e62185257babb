use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rg_family_api::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() {
    // Load .env / .env.local if present so cargo run picks up SUPABASE_URL etc.
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_filename(".env.local");

    let config = AppConfig::from_env();
    let default_filter = match &config {
        Ok(config) => config.api.default_log_filter(),
        Err(_) => "rg_family_api=info,tower_http=info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Starting RG Family API in {:?} mode", config.environment);

    let port = config.api.port;
    let state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to start: {:#}", e);
            std::process::exit(1);
        }
    };

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    info!("RG Family API listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
