//! Draft editing: inline cells, the edit dialog and single-row translation.

use axum::{
    extract::{Form, Path, State},
    http::HeaderMap,
    response::Response,
};
use std::sync::Arc;

use super::utils::back_to_grid;
use crate::api::AppState;
use crate::web_ui::session::SessionHandle;

#[derive(serde::Deserialize)]
pub struct DraftForm {
    pub value: String,
}

#[derive(serde::Deserialize)]
pub struct TranslateForm {
    pub model_id: Option<String>,
}

/// Save a draft typed into the grid (POST /ui/rows/:id/draft)
pub async fn save_cell(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Form(form): Form<DraftForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        match session.grid.edit_cell(id, &form.value).await {
            Ok(()) => session.succeed(format!("Saved draft for row {}", id)),
            Err(e) => session.fail(&e),
        }
    }
    back_to_grid(&handle)
}

/// Open the edit dialog (GET /ui/edit/:id)
pub async fn open_editor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        if let Err(e) = session.grid.open_editor(id) {
            session.fail(&e);
        }
    }
    back_to_grid(&handle)
}

/// Save the edit dialog (POST /ui/edit/:id)
pub async fn save_editor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Form(form): Form<DraftForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        // A stale form for another row reopens the dialog on that row
        if session.grid.editor().map(|e| e.id) != Some(id) {
            if let Err(e) = session.grid.open_editor(id) {
                session.fail(&e);
                return back_to_grid(&handle);
            }
        }

        let result = match session.grid.set_editor_value(&form.value) {
            Ok(()) => session.grid.save_editor().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => session.succeed(format!("Saved draft for row {}", id)),
            Err(e) => session.fail(&e),
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/cancel-edit
pub async fn cancel_editor(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    handle.session.lock().await.grid.cancel_editor();
    back_to_grid(&handle)
}

/// Translate one row with the gateway (POST /ui/translate/:id)
pub async fn translate_row(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Form(form): Form<TranslateForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        let model_id = form.model_id.unwrap_or_else(|| session.model_id.clone());
        match session.grid.translate_row(id, &model_id).await {
            Ok(_) => session.succeed(format!("Translated row {}", id)),
            Err(e) => session.fail(&e),
        }
    }
    back_to_grid(&handle)
}
