//! Who is calling, as far as the HTTP layer can tell.

use std::net::IpAddr;
use url::Url;

/// Connection and host details of one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub remote_ip: Option<IpAddr>,
    /// Address this service accepted the connection on.
    pub local_ip: Option<IpAddr>,
    pub scheme: String,
    /// `Host` header value, port included.
    pub host: Option<String>,
}

impl RequestContext {
    /// `scheme://host[:port]`, or `None` when the host cannot be parsed.
    pub fn host_uri(&self) -> Option<String> {
        let host = self.host.as_deref()?.trim();
        if host.is_empty() {
            return None;
        }

        let url = Url::parse(&format!("{}://{}", self.scheme, host)).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }
        Some(url.origin().ascii_serialization())
    }

    /// True when resolving this caller would fetch our own card.
    pub fn is_self_referential(&self) -> bool {
        let remote = self.remote_ip.map(|ip| ip.to_canonical());
        let local = self.local_ip.map(|ip| ip.to_canonical());

        if remote.is_some_and(|ip| ip.is_loopback()) {
            return true;
        }
        if remote.is_some() && remote == local {
            return true;
        }
        self.host
            .as_deref()
            .is_some_and(|h| h.trim().to_ascii_lowercase().starts_with("localhost"))
    }
}
