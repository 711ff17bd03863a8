mod api;
mod config;
mod db;
mod error;
mod gateway;
mod grid;
mod store;
mod web_ui;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::AppConfig;
use gateway::OpenRouterTranslator;
use store::TranslationStore;

#[tokio::main]
async fn main() {
    // Pick up a local .env before reading any settings
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translation_workbench=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Initialize database
    let db = db::init_database(&config.db_path)
        .await
        .expect("Failed to initialize database");
    tracing::info!("Database initialized at {:?}", config.db_path);

    if config.gateway.api_key.is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; translate actions will fail");
    }

    let translator = Arc::new(OpenRouterTranslator::new(config.gateway.clone()));
    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(TranslationStore::new(db), translator, config));

    let app = Router::new()
        .route("/health", get(api::health))
        .merge(api::api_router())
        .merge(web_ui::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    tracing::info!("Translation workbench starting on http://{}", addr);
    tracing::info!("API Endpoints:");
    tracing::info!("  GET  /api/translations - Paginated, filtered rows");
    tracing::info!("  POST /api/translations - updateTranslation / finalize");
    tracing::info!("  POST /api/translate    - Machine translation");
    tracing::info!("  GET  /api/models       - Model catalog");
    tracing::info!("Web UI: http://{}/", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}
