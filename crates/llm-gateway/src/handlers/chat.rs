//! Chat completion handler.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::response::{IntoResponse, Response};

use crate::gateway::GatewayReply;
use crate::llm::GatewayError;
use crate::response;
use crate::server::AppState;

/// POST /ai
///
/// Body: `{messages, model?, provider?, apiKey?, temperature?, max_tokens?, stream?, tools?, tool_choice?}`.
/// Replies with the provider's OpenAI-shaped body, a normalized Gemini body,
/// or the raw upstream event stream when `stream` is set.
pub async fn chat_completions(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => return GatewayError::from(rejection).into_response(),
    };
    match state.gateway.handle(&body).await {
        Ok(GatewayReply::Json(value)) => response::ok_json(value),
        Ok(GatewayReply::Stream(stream)) => response::event_stream(stream),
        Err(e) => e.into_response(),
    }
}

/// Any non-POST method on the chat route.
pub async fn method_not_allowed() -> Response {
    GatewayError::MethodNotAllowed.into_response()
}
