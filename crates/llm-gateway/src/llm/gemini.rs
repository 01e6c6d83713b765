//! Gemini `generateContent` adapter.
//!
//! Differences from the canonical contract:
//! - The key travels as the `key` query parameter, not a header.
//! - `contents` replaces `messages`; roles are `user` and `model`.
//! - System messages move to a top-level `systemInstruction`.
//! - Sampling parameters live under `generationConfig`.
//! - The answer is read from `candidates[0].content.parts[0].text`.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::error::GatewayError;
use super::provider::Adapter;
use super::types::{ChatRequest, Message, NormalizedResponse, Role};
use super::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use crate::config::ProviderConfig;

#[derive(Default)]
pub struct GeminiAdapter;

impl GeminiAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: [OwnedPart; 1],
}

#[derive(Serialize)]
struct OwnedPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

fn to_contents(messages: &[Message]) -> (Option<SystemInstruction>, Vec<Content<'_>>) {
    let mut system = Vec::new();
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system.push(msg.content.as_str()),
            // Gemini has no equivalent for legacy function messages.
            Role::Function => {}
            Role::User => contents.push(Content {
                role: "user",
                parts: [Part { text: &msg.content }],
            }),
            Role::Assistant | Role::Other(_) => contents.push(Content {
                role: "model",
                parts: [Part { text: &msg.content }],
            }),
        }
    }

    let system_instruction = (!system.is_empty()).then(|| SystemInstruction {
        parts: [OwnedPart {
            text: system.join("\n\n"),
        }],
    });

    (system_instruction, contents)
}

impl Adapter for GeminiAdapter {
    fn endpoint(
        &self,
        config: &ProviderConfig,
        request: &ChatRequest,
        credential: &str,
    ) -> Result<Url, GatewayError> {
        let model = request.model.as_deref().unwrap_or(&config.default_model);
        let mut url = Url::parse(&config.base_url)
            .map_err(|e| GatewayError::internal(format!("invalid Gemini endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::internal("Gemini base URL cannot carry a path"))?
            .pop_if_empty()
            .push("models")
            .push(&format!("{model}:generateContent"));
        url.query_pairs_mut().append_pair("key", credential);
        Ok(url)
    }

    fn payload(
        &self,
        _config: &ProviderConfig,
        request: &ChatRequest,
    ) -> Result<Value, GatewayError> {
        let (system_instruction, contents) = to_contents(&request.messages);
        let body = Request {
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_output_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            },
            system_instruction,
        };
        Ok(serde_json::to_value(body)?)
    }

    fn headers(&self, _credential: &str) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn normalize(&self, body: Value) -> Result<Value, GatewayError> {
        let content = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(serde_json::to_value(NormalizedResponse::assistant(content))?)
    }

    fn supports_streaming(&self) -> bool {
        false
    }
}
