//! Client-visible rejection bodies.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

/// A `429 Too Many Requests` with a `Retry-After` hint and a JSON body.
#[derive(Debug, Clone)]
pub struct TooManyRequests {
    pub retry_after_secs: u64,
    pub body: Value,
}

impl TooManyRequests {
    /// Denial from the sliding-window admission controller.
    pub fn admission(retry_after_secs: u64) -> Self {
        Self {
            retry_after_secs,
            body: json!({
                "error": "Too many requests",
                "message": "Rate limit exceeded. Please try again later.",
            }),
        }
    }

    /// Denial from the fixed-window edge limiter.
    pub fn edge(retry_after_secs: u64) -> Self {
        Self {
            retry_after_secs,
            body: json!({
                "error": "Rate limit exceeded",
                "retryAfter": retry_after_secs,
            }),
        }
    }
}

impl IntoResponse for TooManyRequests {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(self.body)).into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(self.retry_after_secs));
        response
    }
}
