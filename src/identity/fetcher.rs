//! Fetching agent cards over HTTP.

use std::future::Future;
use std::time::Duration;

use crate::config::IdentityConfig;
use crate::identity::card::AgentCard;
use crate::identity::IdentityError;

/// Source of agent cards, keyed by `scheme://host` URI.
pub trait CardFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        host_uri: &str,
    ) -> impl Future<Output = Result<AgentCard, IdentityError>> + Send;
}

/// Fetches `{host_uri}{well_known_path}` with reqwest.
#[derive(Clone)]
pub struct HttpCardFetcher {
    client: reqwest::Client,
    well_known_path: String,
}

impl HttpCardFetcher {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(concat!("resume-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            well_known_path: config.well_known_path.clone(),
        })
    }

    pub fn card_url(&self, host_uri: &str) -> String {
        format!("{}{}", host_uri.trim_end_matches('/'), self.well_known_path)
    }
}

impl CardFetcher for HttpCardFetcher {
    async fn fetch(&self, host_uri: &str) -> Result<AgentCard, IdentityError> {
        let url = self.card_url(host_uri);
        tracing::debug!(url = %url, "Fetching agent card");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                IdentityError::Timeout
            } else {
                IdentityError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(AgentCard::from_json(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_url_joins_path() {
        let fetcher = HttpCardFetcher::new(&IdentityConfig::default()).unwrap();
        assert_eq!(
            fetcher.card_url("https://peer.example/"),
            "https://peer.example/.well-known/agent.json"
        );
        assert_eq!(
            fetcher.card_url("http://10.0.0.5:8080"),
            "http://10.0.0.5:8080/.well-known/agent.json"
        );
    }
}
