//! Gateway error taxonomy.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use thiserror::Error;

/// Every way a single gateway request can fail.
///
/// Each variant maps to an HTTP status and a `{error, detail?}` body; see
/// [`crate::response`] for the rendering.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON body")]
    InvalidRequest { detail: String },

    /// The body could not be read at all (too large, aborted, ...).
    #[error("Invalid request body")]
    BodyRejected { status: u16, detail: String },

    #[error("Streaming is not supported for {provider}")]
    StreamingUnsupported { provider: String },

    #[error("Unknown provider: {name}")]
    UnknownProvider { name: String },

    #[error("Server Configuration Error: No valid keys found for {provider}.")]
    CredentialMissing { provider: String },

    #[error("{provider} API Error")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("AI Gateway Internal Error")]
    Internal { detail: String },
}

impl GatewayError {
    pub fn internal(detail: impl Into<String>) -> Self {
        GatewayError::Internal {
            detail: detail.into(),
        }
    }

    /// HTTP status the error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InvalidRequest { .. }
            | GatewayError::StreamingUnsupported { .. }
            | GatewayError::UnknownProvider { .. } => StatusCode::BAD_REQUEST,
            GatewayError::CredentialMissing { .. } | GatewayError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::BodyRejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            GatewayError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    /// Optional detail string placed next to `error` in the response body.
    pub fn detail(&self) -> Option<String> {
        match self {
            GatewayError::MethodNotAllowed => None,
            GatewayError::InvalidRequest { detail }
            | GatewayError::BodyRejected { detail, .. }
            | GatewayError::Internal { detail } => Some(detail.clone()),
            GatewayError::StreamingUnsupported { provider } => Some(format!(
                "{provider} does not support stream: true; retry without streaming"
            )),
            GatewayError::UnknownProvider { name } => Some(format!(
                "Provider '{name}' is not one of GROQ, OPENAI, OPENROUTER, GEMINI"
            )),
            GatewayError::CredentialMissing { provider } => {
                Some(format!("No valid keys found for {provider}"))
            }
            GatewayError::Upstream { body, .. } => Some(body.clone()),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::internal(err.to_string())
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        GatewayError::BodyRejected {
            status: rejection.status().as_u16(),
            detail: rejection.body_text(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            GatewayError::InvalidRequest {
                detail: "eof".into()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::CredentialMissing {
                provider: "OPENAI".into()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status_is_propagated() {
        let err = GatewayError::Upstream {
            provider: "GROQ".into(),
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "GROQ API Error");
        assert_eq!(err.detail().as_deref(), Some("rate limited"));
    }

    #[test]
    fn test_invalid_upstream_status_becomes_bad_gateway() {
        let err = GatewayError::Upstream {
            provider: "GROQ".into(),
            status: 42,
            body: String::new(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_body_rejected_keeps_status() {
        let err = GatewayError::BodyRejected {
            status: 413,
            detail: "length limit exceeded".into(),
        };
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.to_string(), "Invalid request body");
        assert_eq!(err.detail().as_deref(), Some("length limit exceeded"));
    }

    #[test]
    fn test_credential_missing_names_provider() {
        let err = GatewayError::CredentialMissing {
            provider: "GEMINI".into(),
        };
        assert!(err.to_string().contains("GEMINI"));
        assert!(err.detail().unwrap().contains("GEMINI"));
    }
}
