//! Translation gateway: forwards English text to an LLM chat-completion API
//! and returns the Hungarian translation.

pub mod models;
mod openrouter;

pub use models::{find_model, ModelProfile, DEFAULT_MODEL_ID, TRANSLATION_MODELS};
pub use openrouter::OpenRouterTranslator;

/// Instruction sent ahead of every text to translate
pub const SYSTEM_PROMPT: &str = "You are a professional English to Hungarian translator. \
Only provide the translation without any explanation or additional text. \
Maintain any formatting, special characters, and technical terms.";

/// Translation provider interface
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate English `text` to Hungarian with the catalog model `model_id`
    async fn translate(&self, text: &str, model_id: &str) -> Result<String, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid model ID: {0}")]
    UnknownModel(String),

    #[error("Translation API key is not configured")]
    MissingApiKey,

    #[error("{0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}
