//! Provider identifiers and the adapter trait.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use url::Url;

use super::error::GatewayError;
use super::types::ChatRequest;
use crate::config::ProviderConfig;

/// Supported upstream LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Groq,
    OpenAI,
    OpenRouter,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Groq,
        Provider::OpenAI,
        Provider::OpenRouter,
        Provider::Gemini,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ",
            Provider::OpenAI => "OPENAI",
            Provider::OpenRouter => "OPENROUTER",
            Provider::Gemini => "GEMINI",
        }
    }

    /// Environment variable holding the server-side credential(s).
    pub fn credential_env(&self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEYS",
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_uppercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or(GatewayError::UnknownProvider { name })
    }
}

/// The provider a request was routed to.
///
/// `name` is the requested identifier, uppercased, and is what error messages
/// report. `known` is false when an unrecognised name was routed through the
/// GROQ path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    pub name: String,
    pub provider: Provider,
    pub known: bool,
}

impl ProviderSelection {
    /// Resolve the `provider` field of a request. Absent or empty means GROQ;
    /// a whitespace-only value is an unknown provider like any other.
    pub fn resolve(requested: Option<&str>, strict: bool) -> Result<Self, GatewayError> {
        let Some(requested) = requested.filter(|r| !r.is_empty()) else {
            return Ok(Self::known(Provider::Groq));
        };

        match requested.parse::<Provider>() {
            Ok(provider) => Ok(Self::known(provider)),
            Err(err) if strict => Err(err),
            Err(_) => Ok(Self {
                name: requested.trim().to_uppercase(),
                provider: Provider::Groq,
                known: false,
            }),
        }
    }

    fn known(provider: Provider) -> Self {
        Self {
            name: provider.as_str().to_string(),
            provider,
            known: true,
        }
    }
}

/// Translation between the canonical request/response and one provider's wire format.
pub trait Adapter: Send + Sync {
    /// Upstream URL for this call.
    fn endpoint(
        &self,
        config: &ProviderConfig,
        request: &ChatRequest,
        credential: &str,
    ) -> Result<Url, GatewayError>;

    /// Provider-native JSON body.
    fn payload(&self, config: &ProviderConfig, request: &ChatRequest)
    -> Result<Value, GatewayError>;

    /// Extra request headers, beyond `Content-Type`.
    fn headers(&self, credential: &str) -> Vec<(&'static str, String)>;

    /// Map a successful non-streamed upstream body onto the canonical shape.
    fn normalize(&self, body: Value) -> Result<Value, GatewayError>;

    /// Whether `stream: true` can be honoured.
    fn supports_streaming(&self) -> bool {
        true
    }
}

/// Everything needed to issue one upstream call.
pub struct UpstreamRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub payload: Value,
}

impl UpstreamRequest {
    /// URL with any `key` query parameter masked, for logs.
    pub fn redacted_url(&self) -> String {
        let mut url = self.url.clone();
        if url.query_pairs().any(|(k, _)| k == "key") {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| {
                    let v = if k == "key" { "***".to_string() } else { v.into_owned() };
                    (k.into_owned(), v)
                })
                .collect();
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        url.to_string()
    }
}
