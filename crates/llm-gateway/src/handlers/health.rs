use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{Map, Value, json};

use crate::llm::Provider;
use crate::response;
use crate::server::AppState;

pub async fn livez() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// GET /readyz
///
/// Reports the number of server-side keys per provider. Zero is not a
/// failure: requests can still carry their own `apiKey`.
pub async fn readyz(State(state): State<AppState>) -> Response {
    let providers: Map<String, Value> = Provider::ALL
        .into_iter()
        .map(|p| (p.to_string(), json!(state.gateway.credential_count(p))))
        .collect();
    response::ok_json(json!({"status": "ok", "providers": providers}))
}
