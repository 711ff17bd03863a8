pub mod handlers;
pub mod types;

use std::sync::Arc;
use axum::{routing::{get, post}, Router};

pub use handlers::{health, list_models, list_translations, translate, update_translations, AppState};

/// JSON API router
/// - /api/translations: page query (GET) and draft/finalize actions (POST)
/// - /api/translate: single text translation
/// - /api/models: model catalog
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/translations", get(list_translations).post(update_translations))
        .route("/api/translate", post(translate))
        .route("/api/models", get(list_models))
}
