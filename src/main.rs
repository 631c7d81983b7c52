use std::sync::Arc;

use textwave_api::database::{DatabaseManager, PgStore};
use textwave_api::state::AppState;
use textwave_api::{app, config};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Textwave API in {:?} mode", config.environment);

    let store = Arc::new(
        PgStore::from_env()
            .await
            .unwrap_or_else(|e| panic!("failed to connect to database: {}", e)),
    );
    let state = AppState::new(store.clone(), store);

    if let Err(e) = DatabaseManager::health_check().await {
        tracing::warn!("Database health check failed at startup: {}", e);
    }

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("TEXTWAVE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Textwave API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
