use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use super::types::*;
use crate::config::AppConfig;
use crate::error::{Result, ServerError};
use crate::gateway::{Translator, DEFAULT_MODEL_ID, TRANSLATION_MODELS};
use crate::grid::LocalBackend;
use crate::store::{
    ColumnFilters, FilterColumn, Page, PageRequest, QueryMode, TranslationStore,
};
use crate::web_ui::SessionStore;

const DEFAULT_PAGE_SIZE: u64 = 50;

/// Application state shared across handlers
pub struct AppState {
    pub store: TranslationStore,
    pub translator: Arc<dyn Translator>,
    pub config: AppConfig,
    /// Grid state of each web UI session
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(store: TranslationStore, translator: Arc<dyn Translator>, config: AppConfig) -> Self {
        Self {
            store,
            translator,
            sessions: SessionStore::new(config.grid.session_idle),
            config,
        }
    }

    /// Backend for grid controllers running inside this process
    pub fn grid_backend(&self) -> LocalBackend {
        LocalBackend::new(self.store.clone(), self.translator.clone())
    }
}

/// Parse a JSON body, reporting malformed input as a bad request
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid JSON: {}", e)))
}

fn parse_number(params: &HashMap<String, String>, name: &str, default: u64) -> Result<u64> {
    match params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            ServerError::InvalidRequest(format!("{} must be a positive integer", name))
        }),
    }
}

pub(crate) fn parse_page_request(params: &HashMap<String, String>) -> Result<PageRequest> {
    let page = parse_number(params, "page", 1)?;
    let page_size = parse_number(params, "pageSize", DEFAULT_PAGE_SIZE)?;
    PageRequest::new(page, page_size)
}

/// Pick the query mode from the query string. `search` and column filters are
/// mutually exclusive.
pub(crate) fn parse_query_mode(params: &HashMap<String, String>) -> Result<QueryMode> {
    let filters: ColumnFilters = FilterColumn::ALL
        .into_iter()
        .filter_map(|column| {
            params
                .get(column.as_str())
                .filter(|value| !value.is_empty())
                .map(|value| (column, value.clone()))
        })
        .collect();

    let search = params
        .get("search")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    match search {
        None => Ok(QueryMode::Columns(filters)),
        Some(term) => {
            let has_active_filter = filters.iter().any(|(column, value)| {
                *column != FilterColumn::IsTranslated || value == "true" || value == "false"
            });
            if has_active_filter {
                return Err(ServerError::InvalidRequest(
                    "search cannot be combined with column filters".into(),
                ));
            }
            Ok(QueryMode::Search(term.to_string()))
        }
    }
}

/// GET /api/translations - One page of translations, filtered
pub async fn list_translations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Page>> {
    let request = parse_page_request(&params)?;
    let mode = parse_query_mode(&params)?;
    tracing::debug!("list_translations: page={} mode={:?}", request.page, mode);

    Ok(Json(state.store.page(&request, &mode).await?))
}

/// POST /api/translations - Update a draft or finalize rows
pub async fn update_translations(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<MutationResponse>> {
    let action: TranslationAction = parse_body(&body)?;

    let finalized = match action {
        TranslationAction::UpdateTranslation { id, temp_hungarian } => {
            state.store.update_draft(id, &temp_hungarian).await?;
            None
        }
        TranslationAction::Finalize { ids: Some(ids), .. } => {
            Some(state.store.finalize(&ids).await?)
        }
        TranslationAction::Finalize { id: Some(id), ids: None } => {
            Some(state.store.finalize(&[id]).await?)
        }
        TranslationAction::Finalize { id: None, ids: None } => {
            return Err(ServerError::InvalidRequest(
                "finalize requires id or ids".into(),
            ));
        }
    };

    Ok(Json(MutationResponse {
        success: true,
        finalized,
    }))
}

/// POST /api/translate - Translate text through the configured gateway
pub async fn translate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranslateResponse>> {
    let request: TranslateRequest = parse_body(&body)?;
    let translation = state
        .translator
        .translate(&request.text, &request.model_id)
        .await?;

    Ok(Json(TranslateResponse { translation }))
}

/// GET /api/models - Translation model catalog
pub async fn list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: TRANSLATION_MODELS,
        default: DEFAULT_MODEL_ID,
    })
}

/// GET /health - Health check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::ScriptedTranslator;
    use crate::store::testing::seeded_store;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tempfile::TempDir;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn state() -> (TempDir, Arc<AppState>) {
        let (dir, store) = seeded_store().await;
        let state = AppState::new(
            store,
            Arc::new(ScriptedTranslator::failing_on(&["boom"])),
            AppConfig::default(),
        );
        (dir, Arc::new(state))
    }

    fn status_of(err: ServerError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_page_request_defaults() {
        let request = parse_page_request(&params(&[])).unwrap();
        assert_eq!(request, PageRequest { page: 1, page_size: 50 });

        let request = parse_page_request(&params(&[("page", "3"), ("pageSize", "20")])).unwrap();
        assert_eq!(request.offset(), Some(40));

        assert!(parse_page_request(&params(&[("page", "0")])).is_err());
        assert!(parse_page_request(&params(&[("page", "abc")])).is_err());
        assert!(parse_page_request(&params(&[("pageSize", "-5")])).is_err());
    }

    #[test]
    fn test_query_mode_selection() {
        let mode = parse_query_mode(&params(&[
            ("key", "menu"),
            ("english_text", ""),
            ("line_type", "ignored"),
        ]))
        .unwrap();
        let expected: ColumnFilters = [(FilterColumn::Key, "menu".to_string())].into_iter().collect();
        assert_eq!(mode, QueryMode::Columns(expected));

        let mode = parse_query_mode(&params(&[("search", "  hello "), ("is_translated", "all")])).unwrap();
        assert_eq!(mode, QueryMode::Search("hello".into()));

        let err = parse_query_mode(&params(&[("search", "hello"), ("filename", "menu")])).unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_action_parsing() {
        let action: TranslationAction = parse_body(&Bytes::from_static(
            br#"{"action":"updateTranslation","id":3,"temp_hungarian":"Szia"}"#,
        ))
        .unwrap();
        assert_eq!(
            action,
            TranslationAction::UpdateTranslation { id: 3, temp_hungarian: "Szia".into() }
        );

        let action: TranslationAction =
            parse_body(&Bytes::from_static(br#"{"action":"finalize","ids":[1,2]}"#)).unwrap();
        assert_eq!(action, TranslationAction::Finalize { id: None, ids: Some(vec![1, 2]) });

        let err = parse_body::<TranslationAction>(&Bytes::from_static(br#"{"action":"delete","id":1}"#))
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let err = parse_body::<TranslationAction>(&Bytes::from_static(b"not json")).unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_translations() {
        let (_dir, state) = state().await;
        let Json(page) = list_translations(
            State(state),
            Query(params(&[("page", "1"), ("pageSize", "2"), ("filename", "MENU")])),
        )
        .await
        .unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2]);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["data"][0]["english_text"], "Start Game");
    }

    #[tokio::test]
    async fn test_list_translations_with_extreme_paging() {
        let (_dir, state) = state().await;
        let Json(page) = list_translations(
            State(state.clone()),
            Query(params(&[("page", "9223372036854775807")])),
        )
        .await
        .unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);

        let Json(page) = list_translations(
            State(state),
            Query(params(&[("pageSize", "18446744073709551615")])),
        )
        .await
        .unwrap();
        assert_eq!(page.data.len(), 5);
    }

    #[tokio::test]
    async fn test_update_and_finalize() {
        let (_dir, state) = state().await;

        let Json(response) = update_translations(
            State(state.clone()),
            Bytes::from(r#"{"action":"updateTranslation","id":4,"temp_hungarian":"Üdv"}"#),
        )
        .await
        .unwrap();
        assert!(response.success);
        assert!(response.finalized.is_none());

        let Json(response) = update_translations(
            State(state.clone()),
            Bytes::from_static(br#"{"action":"finalize","ids":[4,1]}"#),
        )
        .await
        .unwrap();
        assert_eq!(response.finalized, Some(2));

        let Json(response) = update_translations(
            State(state.clone()),
            Bytes::from_static(br#"{"action":"finalize","id":4}"#),
        )
        .await
        .unwrap();
        assert_eq!(response.finalized, Some(0));

        let row = state.store.get(4).await.unwrap().unwrap();
        assert_eq!(row.final_hungarian.as_deref(), Some("Üdv"));

        let err = update_translations(
            State(state.clone()),
            Bytes::from(r#"{"action":"updateTranslation","id":4,"temp_hungarian":"Más"}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(status_of(err), StatusCode::CONFLICT);

        let err = update_translations(
            State(state.clone()),
            Bytes::from_static(br#"{"action":"updateTranslation","id":77,"temp_hungarian":"x"}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);

        let err = update_translations(State(state), Bytes::from_static(br#"{"action":"finalize"}"#))
            .await
            .unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_translate_endpoint() {
        let (_dir, state) = state().await;

        let Json(response) = translate(State(state.clone()), Bytes::from_static(br#"{"text":"Hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.translation, "HU: Hello");

        let err = translate(
            State(state.clone()),
            Bytes::from_static(br#"{"text":"Hello","modelId":"unknown"}"#),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServerError::Configuration(_)));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);

        let err = translate(State(state), Bytes::from_static(br#"{"text":"boom","modelId":"gemma"}"#))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "Provider rejected: boom");
    }

    #[tokio::test]
    async fn test_models_listing() {
        let Json(response) = list_models().await;
        assert_eq!(response.default, "deepseek");
        assert_eq!(response.models.len(), 6);
    }
}
