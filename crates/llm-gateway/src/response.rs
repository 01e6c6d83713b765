//! Response helpers shared by the HTTP handlers.

use std::any::Any;

use axum::Json;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::gateway::ByteStream;
use crate::llm::GatewayError;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub fn error(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Response {
    let body = ErrorBody {
        error: error.into(),
        detail,
    };
    (status, Json(body)).into_response()
}

pub fn ok_json(value: Value) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

/// Relay an upstream byte stream as server-sent events, without reframing it.
pub fn event_stream(stream: ByteStream) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// Converts a handler panic into a JSON 500.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(%detail, "Handler panicked");
    error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "AI Gateway Internal Error",
        Some(detail),
    )
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Internal { ref detail } = self {
            error!(%detail, "Gateway request failed");
        }
        error(self.status(), self.to_string(), self.detail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_body_omits_missing_detail() {
        let response = GatewayError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Method not allowed"})
        );
    }

    #[tokio::test]
    async fn test_error_response_is_json() {
        let response = GatewayError::internal("socket closed").into_response();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = body_json(response).await;
        assert_eq!(body["error"], "AI Gateway Internal Error");
        assert_eq!(body["detail"], "socket closed");
    }

    #[tokio::test]
    async fn test_panic_response_reports_message() {
        let response = panic_response(Box::new("oops"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["detail"], "oops");
    }
}
