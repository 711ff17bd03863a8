//! OpenRouter chat-completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{find_model, GatewayError, Translator, SYSTEM_PROMPT};
use crate::config::GatewayConfig;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct OpenRouterTranslator {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl OpenRouterTranslator {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl Translator for OpenRouterTranslator {
    async fn translate(&self, text: &str, model_id: &str) -> Result<String, GatewayError> {
        let model = find_model(model_id)
            .ok_or_else(|| GatewayError::UnknownModel(model_id.to_string()))?;
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingApiKey)?;

        let body = ChatRequest {
            model: model.model_name,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: model.temperature,
            max_tokens: model.max_tokens,
            stream: false,
        };

        let mut request = self.client.post(self.endpoint()).bearer_auth(api_key).json(&body);
        if let Some(referer) = &self.config.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            request = request.header("X-Title", title);
        }

        tracing::debug!("Requesting translation from {} ({} chars)", model.model_name, text.len());
        let response = request.send().await?;
        let status = response.status();
        let raw = response.text().await?;
        let json: Option<serde_json::Value> = serde_json::from_str(&raw).ok();

        if !status.is_success() {
            let message = json
                .as_ref()
                .and_then(upstream_message)
                .unwrap_or_else(|| format!("OpenRouter API error (HTTP {})", status.as_u16()));
            tracing::warn!("Translation request failed with {}: {}", status, message);
            return Err(GatewayError::Upstream(message));
        }

        let json = json.ok_or_else(|| GatewayError::MalformedResponse("body is not JSON".into()))?;
        // Some upstream failures arrive with a 200 status
        if let Some(message) = upstream_message(&json) {
            return Err(GatewayError::Upstream(message));
        }

        let completion: ChatResponse = serde_json::from_value(json)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| GatewayError::MalformedResponse("no completion content".into()))
    }
}

/// Error message from either `{"error": {"message": ..}}` or `{"message": ..}`
fn upstream_message(body: &serde_json::Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(|m| m.as_str())
        .or_else(|| body.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
}
