//! Web UI route handlers.

mod edit_handlers;
mod grid_handlers;
mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::AppState;
use edit_handlers::{cancel_editor, open_editor, save_cell, save_editor, translate_row};
use grid_handlers::{
    apply_filters, change_page, clear_filters, clear_selection, edit_filter, finalize_selected,
    index, next_page, prev_page, select_all, select_range, set_model, toggle_row,
    translate_selected,
};

/// Create the web UI router. Every action posts a form and redirects back to `/`.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/ui/filters", post(apply_filters))
        .route("/ui/filters/clear", post(clear_filters))
        .route("/ui/filter/:column", post(edit_filter))
        .route("/ui/page", post(change_page))
        .route("/ui/page/next", post(next_page))
        .route("/ui/page/prev", post(prev_page))
        .route("/ui/select/:id", post(toggle_row))
        .route("/ui/select-all", post(select_all))
        .route("/ui/select-range", post(select_range))
        .route("/ui/clear", post(clear_selection))
        .route("/ui/model", post(set_model))
        .route("/ui/rows/:id/draft", post(save_cell))
        .route("/ui/edit/:id", get(open_editor).post(save_editor))
        .route("/ui/cancel-edit", post(cancel_editor))
        .route("/ui/translate/:id", post(translate_row))
        .route("/ui/translate-selected", post(translate_selected))
        .route("/ui/finalize", post(finalize_selected))
}
