//! Admission middleware for the `/a2a` surface.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::http::request::client_id;
use crate::http::response::TooManyRequests;
use crate::security::admission::{Admission, AdmissionController, RateLimitInfo};
use crate::security::ceil_secs;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_GLOBAL_LIMIT: &str = "x-ratelimit-global-limit";
pub const X_RATELIMIT_GLOBAL_REMAINING: &str = "x-ratelimit-global-remaining";
pub const X_RATELIMIT_DAILY_LIMIT: &str = "x-ratelimit-daily-limit";
pub const X_RATELIMIT_DAILY_REMAINING: &str = "x-ratelimit-daily-remaining";

/// Check the caller against the admission controller.
///
/// Admitted responses carry the caller's remaining quota; denials short
/// circuit with a 429.
pub async fn admission_middleware(
    State(admission): State<Arc<AdmissionController>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_id(&request);

    match admission.check(&client) {
        Admission::Admitted => {
            let mut response = next.run(request).await;
            let info = admission.rate_limit_info(&client);
            apply_rate_limit_headers(response.headers_mut(), &info);
            response
        }
        Admission::Denied { retry_after, .. } => {
            TooManyRequests::admission(ceil_secs(retry_after)).into_response()
        }
    }
}

pub fn apply_rate_limit_headers(headers: &mut HeaderMap, info: &RateLimitInfo) {
    let values = [
        (X_RATELIMIT_LIMIT, info.per_minute_limit),
        (X_RATELIMIT_REMAINING, info.per_minute_remaining),
        (X_RATELIMIT_GLOBAL_LIMIT, info.global_limit),
        (X_RATELIMIT_GLOBAL_REMAINING, info.global_remaining),
        (X_RATELIMIT_DAILY_LIMIT, info.per_day_limit),
        (X_RATELIMIT_DAILY_REMAINING, info.per_day_remaining),
    ];
    for (name, value) in values {
        headers.insert(HeaderName::from_static(name), HeaderValue::from(value));
    }
}
