//! OpenAI-compatible adapter.
//!
//! Serves GROQ, OPENAI and OPENROUTER, which all accept the canonical
//! chat-completions body and answer in the canonical shape.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::error::GatewayError;
use super::provider::Adapter;
use super::types::{ChatRequest, Message};
use super::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::config::ProviderConfig;

/// Adapter for providers speaking the OpenAI chat-completions API.
pub struct OpenAICompatibleAdapter {
    route_hint: Option<&'static str>,
    extra_headers: Vec<(&'static str, String)>,
}

impl OpenAICompatibleAdapter {
    pub fn new() -> Self {
        Self {
            route_hint: None,
            extra_headers: Vec::new(),
        }
    }

    /// OpenRouter variant: adds `route: "fallback"` and the app attribution headers.
    pub fn openrouter(referer: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            route_hint: Some("fallback"),
            extra_headers: vec![("HTTP-Referer", referer.into()), ("X-Title", title.into())],
        }
    }
}

impl Default for OpenAICompatibleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<&'static str>,
}

impl Adapter for OpenAICompatibleAdapter {
    fn endpoint(
        &self,
        config: &ProviderConfig,
        _request: &ChatRequest,
        _credential: &str,
    ) -> Result<Url, GatewayError> {
        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Url::parse(&url).map_err(|e| GatewayError::internal(format!("invalid endpoint {url}: {e}")))
    }

    fn payload(
        &self,
        config: &ProviderConfig,
        request: &ChatRequest,
    ) -> Result<Value, GatewayError> {
        let payload = Payload {
            model: request.model.as_deref().unwrap_or(&config.default_model),
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            stream: request.wants_stream(),
            tools: request.tools.as_ref(),
            tool_choice: request.tool_choice.as_ref(),
            route: self.route_hint,
        };
        Ok(serde_json::to_value(payload)?)
    }

    fn headers(&self, credential: &str) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Authorization", format!("Bearer {}", credential))];
        headers.extend(self.extra_headers.iter().cloned());
        headers
    }

    fn normalize(&self, body: Value) -> Result<Value, GatewayError> {
        Ok(body)
    }
}
