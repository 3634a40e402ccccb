//! Edge endpoint guards: per-IP fixed-window limit and the API key stub.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::config::A2aConfig;
use crate::http::request::client_id;
use crate::http::response::TooManyRequests;
use crate::security::edge_limit::{EdgeDecision, EdgeRateLimiter};

pub const X_API_KEY: &str = "x-api-key";

pub async fn edge_limit_middleware(
    State(limiter): State<Arc<EdgeRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_id(&request);

    match limiter.check(&client) {
        EdgeDecision::Allowed => next.run(request).await,
        EdgeDecision::Denied {
            retry_after_secs, ..
        } => TooManyRequests::edge(retry_after_secs).into_response(),
    }
}

/// Pass-through unless `require_auth` is set, in which case `X-API-Key` must
/// equal one of the configured keys.
pub async fn api_key_middleware(
    State(config): State<Arc<A2aConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !config.require_auth {
        return next.run(request).await;
    }

    let authorized = request
        .headers()
        .get(X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| config.api_keys.iter().any(|k| k == key));

    if authorized {
        return next.run(request).await;
    }

    tracing::warn!(
        client = %client_id(&request),
        "Rejected edge request: invalid or missing API key"
    );
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid or missing API key." })),
    )
        .into_response()
}
