//! Static catalog of translation models.

use serde::Serialize;

pub const DEFAULT_MODEL_ID: &str = "deepseek";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub display_name: &'static str,
    /// Model name understood by the upstream API
    pub model_name: &'static str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub description: &'static str,
    pub pricing: &'static str,
}

pub static TRANSLATION_MODELS: &[ModelProfile] = &[
    ModelProfile {
        id: "deepseek",
        name: "deepseek-r1",
        display_name: "DeepSeek R1",
        model_name: "deepseek/deepseek-r1:free",
        temperature: 0.7,
        max_tokens: 10_000,
        description: "Open-weight reasoning model with strong instruction following",
        pricing: "Free",
    },
    ModelProfile {
        id: "mistral",
        name: "mistral-7b-instruct",
        display_name: "Mistral 7B Instruct",
        model_name: "mistralai/mistral-7b-instruct:free",
        temperature: 0.7,
        max_tokens: 10_000,
        description: "Fast 7.3B parameter instruction-tuned model",
        pricing: "Free",
    },
    ModelProfile {
        id: "openchat",
        name: "openchat-7b",
        display_name: "OpenChat 7B",
        model_name: "openchat/openchat-7b:free",
        temperature: 0.7,
        max_tokens: 10_000,
        description: "Open chat model built on Mistral 7B with an extended context",
        pricing: "Free",
    },
    ModelProfile {
        id: "gemini",
        name: "gemini-2-flash",
        display_name: "Gemini 2.0 Flash",
        model_name: "google/gemini-2.0-flash-exp:free",
        temperature: 0.7,
        max_tokens: 1_000_000,
        description: "Fast experimental release of Gemini 2.0",
        pricing: "Free",
    },
    ModelProfile {
        id: "gemma",
        name: "gemma-2-9b",
        display_name: "Gemma 2 9B",
        model_name: "google/gemma-2-9b-it:free",
        temperature: 0.7,
        max_tokens: 10_000,
        description: "Compact instruction-tuned model from Google",
        pricing: "Free",
    },
    ModelProfile {
        id: "llama",
        name: "llama-3-70b",
        display_name: "LLaMA 3 70B",
        model_name: "meta-llama/llama-3.1-70b-instruct:free",
        temperature: 0.7,
        max_tokens: 10_000,
        description: "Meta's 70B parameter open-weight instruction model",
        pricing: "Free",
    },
];

pub fn find_model(id: &str) -> Option<&'static ModelProfile> {
    TRANSLATION_MODELS.iter().find(|model| model.id == id)
}
