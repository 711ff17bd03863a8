//! Grid page and the actions posted from its toolbar.

use std::collections::HashMap;

use axum::{
    extract::{Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tera::Context;

use super::utils::{back_to_grid, display_filename, render_error, render_template};
use crate::api::AppState;
use crate::gateway::{find_model, TRANSLATION_MODELS};
use crate::grid::{is_selectable, EditorState, Selection};
use crate::store::{FilterColumn, TranslationRow};
use crate::web_ui::session::{notice_message, GridSession, SessionHandle};

/// Grid row as rendered
#[derive(Serialize)]
struct RowView {
    id: i32,
    filename: String,
    path: String,
    key: String,
    english_text: String,
    temp_hungarian: String,
    final_hungarian: String,
    is_translated: bool,
    selectable: bool,
    selected: bool,
}

impl RowView {
    fn new(row: &TranslationRow, selection: &Selection) -> Self {
        let path = row.filename.clone().unwrap_or_default();
        Self {
            id: row.id,
            filename: display_filename(&path).to_string(),
            key: row.key.clone().unwrap_or_default(),
            english_text: row.english_text.clone(),
            temp_hungarian: row.temp_hungarian.clone().unwrap_or_default(),
            final_hungarian: row.final_hungarian.clone().unwrap_or_default(),
            is_translated: row.is_translated,
            selectable: is_selectable(row),
            selected: selection.contains(row.id),
            path,
        }
    }
}

#[derive(Serialize)]
struct FilterField {
    name: &'static str,
    label: &'static str,
    value: String,
}

#[derive(Serialize)]
struct EditorView {
    id: i32,
    key: String,
    english_text: String,
    value: String,
}

impl From<&EditorState> for EditorView {
    fn from(editor: &EditorState) -> Self {
        Self {
            id: editor.id,
            key: editor.key.clone().unwrap_or_default(),
            english_text: editor.english_text.clone(),
            value: editor.value.clone(),
        }
    }
}

fn column_label(column: FilterColumn) -> &'static str {
    match column {
        FilterColumn::Id => "ID",
        FilterColumn::Filename => "File",
        FilterColumn::Key => "Key",
        FilterColumn::EnglishText => "English",
        FilterColumn::TempHungarian => "Draft",
        FilterColumn::FinalHungarian => "Final",
        FilterColumn::IsTranslated => "Status",
    }
}

fn grid_context(session: &mut GridSession) -> Context {
    let mut context = Context::new();
    context.insert("notice", &session.notice.take());
    context.insert("model_id", &session.model_id);
    context.insert("models", TRANSLATION_MODELS);

    let grid = &session.grid;
    let rows: Vec<RowView> = grid
        .rows()
        .iter()
        .map(|row| RowView::new(row, grid.selection()))
        .collect();
    let filters: Vec<FilterField> = FilterColumn::ALL
        .into_iter()
        .filter(|column| *column != FilterColumn::IsTranslated)
        .map(|column| FilterField {
            name: column.as_str(),
            label: column_label(column),
            value: grid.filter_input(column).to_string(),
        })
        .collect();

    context.insert("eligible_count", &rows.iter().filter(|r| r.selectable).count());
    context.insert("rows", &rows);
    context.insert("filters", &filters);
    context.insert("status_filter", grid.filter_input(FilterColumn::IsTranslated));
    context.insert("selected_count", &grid.selection().len());
    context.insert("page", &grid.page());
    context.insert("total", &grid.total());
    context.insert("total_pages", &grid.total_pages().max(1));
    context.insert("editor", &grid.editor().map(EditorView::from));
    context.insert("debounce_ms", &(grid.filter_debounce().as_millis() as u64));
    context
}

/// Grid page (GET /)
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    let mut session = handle.session.lock().await;

    // Typed filters still waiting out the debounce are applied before rendering
    let loaded = if session.grid.has_pending_filters() {
        session.grid.await_filters().await.map(|_| ())
    } else {
        session.grid.refresh().await
    };
    if let Err(e) = loaded {
        tracing::error!("Failed to load translations: {}", e);
        return handle.attach_cookie(render_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            &notice_message(&e),
        ));
    }

    let context = grid_context(&mut session);
    handle.attach_cookie(render_template("grid.html", &context))
}

/// Apply the filter row immediately (POST /ui/filters)
pub async fn apply_filters(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        for column in FilterColumn::ALL {
            let value = form.get(column.as_str()).map(|v| v.trim()).unwrap_or("");
            session.grid.set_filter(column, value);
        }
        if let Err(e) = session.grid.flush_filters().await {
            session.fail(&e);
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/filters/clear
pub async fn clear_filters(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        if let Err(e) = session.grid.clear_filters().await {
            session.fail(&e);
        }
    }
    back_to_grid(&handle)
}

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub value: String,
}

/// Record one keystroke-level filter edit (POST /ui/filter/:column). The
/// edit is applied once typing pauses for the debounce delay.
pub async fn edit_filter(
    State(state): State<Arc<AppState>>,
    Path(column): Path<String>,
    headers: HeaderMap,
    Form(form): Form<FilterForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    let Some(column) = FilterColumn::parse(&column) else {
        return handle.attach_cookie(
            (StatusCode::BAD_REQUEST, format!("Unknown filter column: {}", column)).into_response(),
        );
    };

    handle
        .session
        .lock()
        .await
        .grid
        .set_filter(column, form.value.trim());
    handle.attach_cookie(StatusCode::NO_CONTENT.into_response())
}

#[derive(Deserialize)]
pub struct PageForm {
    pub page: String,
}

/// POST /ui/page
pub async fn change_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<PageForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        match form.page.trim().parse::<u64>() {
            Ok(page) => {
                if let Err(e) = session.grid.go_to_page(page).await {
                    session.fail(&e);
                }
            }
            Err(_) => session.reject("Page must be a number"),
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/page/next
pub async fn next_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        if let Err(e) = session.grid.next_page().await {
            session.fail(&e);
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/page/prev
pub async fn prev_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        if let Err(e) = session.grid.prev_page().await {
            session.fail(&e);
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/select/:id
pub async fn toggle_row(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        if let Err(e) = session.grid.toggle(id) {
            session.fail(&e);
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/select-all
pub async fn select_all(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    handle.session.lock().await.grid.select_all_eligible();
    back_to_grid(&handle)
}

#[derive(Deserialize)]
pub struct RangeForm {
    pub start: String,
    pub end: String,
}

/// POST /ui/select-range
pub async fn select_range(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RangeForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        match (form.start.trim().parse(), form.end.trim().parse()) {
            (Ok(start), Ok(end)) => match session.grid.select_range(start, end) {
                Ok(added) => session.succeed(format!("Selected {} rows", added)),
                Err(e) => session.fail(&e),
            },
            _ => session.reject("Range bounds must be row ids"),
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/clear
pub async fn clear_selection(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    handle.session.lock().await.grid.clear_selection();
    back_to_grid(&handle)
}

#[derive(Deserialize)]
pub struct ModelForm {
    pub model_id: Option<String>,
}

impl ModelForm {
    fn chosen(&self) -> Option<&str> {
        self.model_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// POST /ui/model - Choose the model used by translate actions
pub async fn set_model(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ModelForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        match form.chosen() {
            Some(id) => match find_model(id) {
                Some(model) => session.model_id = model.id.to_string(),
                None => session.reject(format!("Unknown model: {}", id)),
            },
            None => session.reject("Choose a model"),
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/translate-selected
pub async fn translate_selected(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ModelForm>,
) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        let model_id = match form.chosen() {
            Some(id) => id.to_string(),
            None => session.model_id.clone(),
        };
        match session.grid.bulk_translate(&model_id).await {
            Ok(count) => session.succeed(format!("Translated {} rows", count)),
            Err(e) => session.fail(&e),
        }
    }
    back_to_grid(&handle)
}

/// POST /ui/finalize
pub async fn finalize_selected(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let handle = SessionHandle::resolve(&state, &headers);
    {
        let mut session = handle.session.lock().await;
        match session.grid.finalize_selected().await {
            Ok(count) => session.succeed(format!("Finalized {} translations", count)),
            Err(e) => session.fail(&e),
        }
    }
    back_to_grid(&handle)
}
