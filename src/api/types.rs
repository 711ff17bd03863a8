//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

use crate::gateway::{ModelProfile, DEFAULT_MODEL_ID};

// ============================================================================
// Request Types
// ============================================================================

/// POST /api/translations request body, dispatched on `action`
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TranslationAction {
    UpdateTranslation {
        id: i32,
        temp_hungarian: String,
    },
    Finalize {
        #[serde(default)]
        id: Option<i32>,
        #[serde(default)]
        ids: Option<Vec<i32>>,
    },
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

/// POST /api/translate request body
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(rename = "modelId", default = "default_model_id")]
    pub model_id: String,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translation: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: &'static [ModelProfile],
    pub default: &'static str,
}
