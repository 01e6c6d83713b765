use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::warn;

use crate::config::ServerConfig;
use crate::gateway::Gateway;
use crate::handlers;
use crate::llm::GatewayError;
use crate::response;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

pub fn build_app(state: AppState, server: &ServerConfig) -> Router {
    let route = if server.route.starts_with('/') {
        server.route.clone()
    } else {
        format!("/{}", server.route)
    };

    let mut chat = post(handlers::chat_completions).fallback(handlers::method_not_allowed);
    if server.request_timeout_seconds > 0 {
        let limit = Duration::from_secs(server.request_timeout_seconds);
        chat = chat.layer(middleware::from_fn_with_state(limit, request_timeout));
    }

    Router::new()
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz))
        .route(&route, chat)
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(CatchPanicLayer::custom(response::panic_response))
}

/// Fails the request with a JSON 500 once `limit` passes without a response.
///
/// Only the wait for response headers is bounded; a relayed stream that has
/// started is left alone.
async fn request_timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(seconds = limit.as_secs(), "Request timed out");
            GatewayError::internal(format!("request timed out after {}s", limit.as_secs()))
                .into_response()
        }
    }
}
