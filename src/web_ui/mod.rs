//! Web UI Module
//!
//! Server-rendered translation grid. Each browser session owns a grid
//! controller kept in [`SessionStore`]; forms post an action and redirect
//! back to the grid.

mod routes;
mod session;
mod templates;

use axum::Router;
use std::sync::Arc;

use crate::api::AppState;

pub use session::SessionStore;

/// Create the web UI router.
/// Mount this with `.merge(web_ui::router())` in main.rs
pub fn router() -> Router<Arc<AppState>> {
    routes::create_router()
}
