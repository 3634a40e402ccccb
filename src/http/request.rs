//! Request inspection.
//!
//! # Responsibilities
//! - Capture remote and local socket addresses per connection
//! - Derive the client identifier used for rate limiting
//! - Build the [`RequestContext`] used for caller identity resolution

use axum::{
    extract::{connect_info::Connected, ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap, Request},
    serve::IncomingStream,
};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

use crate::http::server::AppState;
use crate::identity::RequestContext;

pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Client identifier used when the connection address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Both ends of an accepted connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionAddrs {
    pub remote: SocketAddr,
    pub local: Option<SocketAddr>,
}

impl Connected<IncomingStream<'_, TcpListener>> for ConnectionAddrs {
    fn connect_info(stream: IncomingStream<'_, TcpListener>) -> Self {
        Self {
            remote: *stream.remote_addr(),
            local: stream.io().local_addr().ok(),
        }
    }
}

fn connection(extensions: &axum::http::Extensions) -> Option<ConnectionAddrs> {
    extensions
        .get::<ConnectInfo<ConnectionAddrs>>()
        .map(|ConnectInfo(addrs)| *addrs)
}

pub fn client_ip<B>(request: &Request<B>) -> Option<IpAddr> {
    connection(request.extensions()).map(|c| c.remote.ip())
}

/// Textual client IP, or `"unknown"`.
pub fn client_id<B>(request: &Request<B>) -> String {
    client_ip(request)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn scheme(headers: &HeaderMap) -> String {
    headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "http".to_string())
}

fn host(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        let conn = connection(&parts.extensions);
        Self {
            remote_ip: conn.map(|c| c.remote.ip()),
            local_ip: conn.and_then(|c| c.local).map(|a| a.ip()),
            scheme: scheme(&parts.headers),
            host: host(&parts.headers),
        }
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(remote: Option<&str>, headers: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().uri("/a2a/ask");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(remote) = remote {
            req.extensions_mut().insert(ConnectInfo(ConnectionAddrs {
                remote: remote.parse().unwrap(),
                local: Some("10.0.0.1:8080".parse().unwrap()),
            }));
        }
        req
    }

    #[test]
    fn test_client_id() {
        assert_eq!(client_id(&request(Some("203.0.113.9:5555"), &[])), "203.0.113.9");
        assert_eq!(client_id(&request(None, &[])), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_context_from_parts() {
        let (parts, _) = request(
            Some("203.0.113.9:5555"),
            &[("host", "peer.example:8443"), (X_FORWARDED_PROTO, "HTTPS, http")],
        )
        .into_parts();

        let ctx = RequestContext::from_parts(&parts);
        assert_eq!(ctx.remote_ip, "203.0.113.9".parse().ok());
        assert_eq!(ctx.local_ip, "10.0.0.1".parse().ok());
        assert_eq!(ctx.scheme, "https");
        assert_eq!(ctx.host_uri().as_deref(), Some("https://peer.example:8443"));
    }

    #[test]
    fn test_context_defaults() {
        let (parts, _) = request(None, &[]).into_parts();
        let ctx = RequestContext::from_parts(&parts);

        assert_eq!(ctx.scheme, "http");
        assert!(ctx.remote_ip.is_none());
        assert!(ctx.host.is_none());
    }
}
