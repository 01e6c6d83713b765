//! The per-request gateway flow.
//!
//! ```text
//! RECEIVED → VALIDATED → PROVIDER_RESOLVED → CREDENTIAL_RESOLVED
//!          → PAYLOAD_BUILT → UPSTREAM_CALLED → STREAM_RELAYED | RESPONSE_NORMALIZED
//! ```
//!
//! Any step may short-circuit with a [`GatewayError`], which the HTTP layer
//! renders as a JSON error response. Nothing here holds per-request state
//! between calls; the registry and credential store are read-only.

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use ulid::Ulid;

use crate::config::Config;
use crate::llm::{
    Adapter, ChatRequest, CredentialStore, GatewayError, KeySelector, Provider, ProviderRegistry,
    ProviderSelection, RandomKeySelector, UpstreamRequest,
};

/// Raw upstream bytes relayed to the caller.
pub type ByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Successful outcome of one request.
pub enum GatewayReply {
    /// Non-streamed body: passthrough or normalized.
    Json(Value),
    /// Upstream event stream, unmodified.
    Stream(ByteStream),
}

impl std::fmt::Debug for GatewayReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayReply::Json(value) => f.debug_tuple("Json").field(value).finish(),
            GatewayReply::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A fully-built upstream call, ready to send.
pub struct PreparedCall {
    pub selection: ProviderSelection,
    pub stream: bool,
    pub request: UpstreamRequest,
    adapter: Arc<dyn Adapter>,
}

/// Stateless translator between canonical requests and provider APIs.
pub struct Gateway {
    client: reqwest::Client,
    registry: ProviderRegistry,
    credentials: CredentialStore,
    selector: Arc<dyn KeySelector>,
    strict_providers: bool,
}

impl Gateway {
    pub fn new(registry: ProviderRegistry, credentials: CredentialStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            registry,
            credentials,
            selector: Arc::new(RandomKeySelector),
            strict_providers: false,
        }
    }

    pub fn from_config(config: &Config, credentials: CredentialStore) -> Self {
        let registry = ProviderRegistry::from_config(&config.providers, &config.gateway);
        Self::new(registry, credentials).with_strict_providers(config.gateway.strict_providers)
    }

    /// Replace the pool key selector (tests use a deterministic one).
    pub fn with_selector(mut self, selector: Arc<dyn KeySelector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_strict_providers(mut self, strict: bool) -> Self {
        self.strict_providers = strict;
        self
    }

    /// Number of server-side keys configured for `provider`.
    pub fn credential_count(&self, provider: Provider) -> usize {
        self.credentials.key_count(provider)
    }

    /// Log which providers have server-side credentials.
    pub fn log_credentials(&self) {
        let mut configured = 0;
        for provider in Provider::ALL {
            let count = self.credential_count(provider);
            if count > 0 {
                configured += 1;
                info!(%provider, keys = count, "Server-side credential configured");
            }
        }
        if configured == 0 {
            warn!(
                "No server-side credentials configured; requests must carry apiKey. \
                Set GROQ_API_KEYS, OPENAI_API_KEY, OPENROUTER_API_KEY, or GEMINI_API_KEY."
            );
        }
    }

    /// Handle one raw request body.
    pub async fn handle(&self, body: &[u8]) -> Result<GatewayReply, GatewayError> {
        let request_id = Ulid::new();
        async move {
            let request = parse_request(body)?;
            let call = self.prepare(&request)?;
            self.execute(call).await
        }
        .instrument(info_span!("chat", %request_id))
        .await
    }

    /// Resolve provider and credential and build the upstream request,
    /// without sending anything.
    pub fn prepare(&self, request: &ChatRequest) -> Result<PreparedCall, GatewayError> {
        let selection =
            ProviderSelection::resolve(request.provider.as_deref(), self.strict_providers)?;
        if !selection.known {
            warn!(provider = %selection.name, "Unknown provider, using GROQ path");
        }

        let entry = self.registry.get(selection.provider).ok_or_else(|| {
            GatewayError::internal(format!("provider {} not registered", selection.provider))
        })?;

        let stream = request.wants_stream();
        if stream && !entry.adapter.supports_streaming() {
            return Err(GatewayError::StreamingUnsupported {
                provider: selection.name,
            });
        }

        let credential = self.credentials.resolve(
            request.api_key.as_deref(),
            &selection,
            self.selector.as_ref(),
        )?;

        let adapter = Arc::clone(&entry.adapter);
        let upstream = UpstreamRequest {
            url: adapter.endpoint(&entry.config, request, credential.expose())?,
            headers: adapter.headers(credential.expose()),
            payload: adapter.payload(&entry.config, request)?,
        };

        Ok(PreparedCall {
            selection,
            stream,
            request: upstream,
            adapter,
        })
    }

    /// Send a prepared call and shape its result. Exactly one upstream attempt.
    pub async fn execute(&self, call: PreparedCall) -> Result<GatewayReply, GatewayError> {
        let PreparedCall {
            selection,
            stream,
            request,
            adapter,
        } = call;

        info!(
            provider = %selection.name,
            url = %request.redacted_url(),
            stream,
            "Forwarding chat completion"
        );

        let mut builder = self
            .client
            .post(request.url)
            .header("Content-Type", "application/json");
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.json(&request.payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %selection.name, status, "Upstream returned an error");
            return Err(GatewayError::Upstream {
                provider: selection.name,
                status,
                body,
            });
        }

        if stream {
            debug!(provider = %selection.name, "Relaying upstream event stream");
            return Ok(GatewayReply::Stream(response.bytes_stream().boxed()));
        }

        let body: Value = response.json().await?;
        Ok(GatewayReply::Json(adapter.normalize(body)?))
    }
}

fn parse_request(body: &[u8]) -> Result<ChatRequest, GatewayError> {
    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidRequest {
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FirstKey;

    impl KeySelector for FirstKey {
        fn select<'a>(&self, keys: &'a [String]) -> Option<&'a str> {
            keys.first().map(String::as_str)
        }
    }

    fn gateway(credentials: CredentialStore) -> Gateway {
        Gateway::from_config(&Config::default(), credentials).with_selector(Arc::new(FirstKey))
    }

    fn request(json: Value) -> ChatRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_parse_request_rejects_bad_json() {
        let err = parse_request(b"{not json").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest { .. }));
    }

    #[test]
    fn test_prepare_groq_uses_pool_key() {
        let gw = gateway(CredentialStore::new().with_keys(Provider::Groq, ["k1", "k2"]));
        let call = gw
            .prepare(&request(json!({"messages": [{"role": "user", "content": "Hi"}]})))
            .unwrap();

        assert_eq!(call.selection.provider, Provider::Groq);
        assert!(!call.stream);
        assert_eq!(
            call.request.url.as_str(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert!(
            call.request
                .headers
                .contains(&("Authorization", "Bearer k1".to_string()))
        );
    }

    #[test]
    fn test_prepare_is_idempotent_for_fixed_credential() {
        let gw = gateway(CredentialStore::new());
        let req = request(json!({
            "messages": [{"role": "user", "content": "Hi"}],
            "provider": "openrouter",
            "apiKey": "fixed"
        }));

        let first = gw.prepare(&req).unwrap();
        let second = gw.prepare(&req).unwrap();
        assert_eq!(first.request.url, second.request.url);
        assert_eq!(first.request.headers, second.request.headers);
        assert_eq!(first.request.payload, second.request.payload);
    }

    #[test]
    fn test_prepare_gemini_stream_fails_fast() {
        let gw = gateway(CredentialStore::new().with_keys(Provider::Gemini, ["g"]));
        let result = gw.prepare(&request(json!({
            "messages": [],
            "provider": "gemini",
            "stream": true
        })));
        assert!(matches!(
            result,
            Err(GatewayError::StreamingUnsupported { ref provider }) if provider == "GEMINI"
        ));
    }

    #[test]
    fn test_prepare_missing_credential() {
        let gw = gateway(CredentialStore::new());
        let result = gw.prepare(&request(json!({"messages": [], "provider": "OpenAI"})));
        assert!(matches!(
            result,
            Err(GatewayError::CredentialMissing { ref provider }) if provider == "OPENAI"
        ));
    }

    #[test]
    fn test_prepare_strict_rejects_unknown_provider() {
        let gw = gateway(CredentialStore::new()).with_strict_providers(true);
        let result = gw.prepare(&request(json!({
            "messages": [],
            "provider": "mistral",
            "apiKey": "k"
        })));
        assert!(matches!(result, Err(GatewayError::UnknownProvider { .. })));
    }

    #[test]
    fn test_prepare_blank_provider_gets_no_pool_key() {
        let gw = gateway(CredentialStore::new().with_keys(Provider::Groq, ["k1"]));
        let result = gw.prepare(&request(json!({"messages": [], "provider": "  "})));
        assert!(matches!(result, Err(GatewayError::CredentialMissing { .. })));
    }

    #[test]
    fn test_prepare_unknown_provider_takes_groq_path() {
        let gw = gateway(CredentialStore::new());
        let call = gw
            .prepare(&request(json!({
                "messages": [],
                "provider": "mistral",
                "apiKey": "k"
            })))
            .unwrap();
        assert_eq!(call.selection.name, "MISTRAL");
        assert_eq!(call.request.url.host_str(), Some("api.groq.com"));
    }
}
