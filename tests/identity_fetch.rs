//! Agent card fetching against a live peer.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use resume_agent::config::{IdentityConfig, RateLimitConfig};
use resume_agent::identity::{AgentCardCache, CardFetcher, HttpCardFetcher, IdentityError};
use resume_agent::security::AdmissionController;

mod common;

const PEER_CARD: &str = r#"{
    "name": "Peer Agent",
    "description": "Answers scheduling questions",
    "url": "http://peer.example",
    "version": "2.1.0",
    "capabilities": { "streaming": false },
    "defaultInputModes": ["text"],
    "defaultOutputModes": ["text"],
    "skills": [{ "id": "calendar" }]
}"#;

fn fetcher() -> HttpCardFetcher {
    HttpCardFetcher::new(&IdentityConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_full_card() {
    let (addr, hits) = common::start_mock_agent(PEER_CARD).await;

    let card = fetcher().fetch(&format!("http://{}", addr)).await.unwrap();
    assert_eq!(card.name, "Peer Agent");
    assert_eq!(card.version.as_deref(), Some("2.1.0"));
    assert!(card.extra.contains_key("skills"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_normalizes_sparse_card() {
    let (addr, _) = common::start_mock_agent("{}").await;

    let card = fetcher().fetch(&format!("http://{}", addr)).await.unwrap();
    assert_eq!(card.name, "unknown");
    assert_eq!(card.description, "No description provided");
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let (addr, _) =
        common::start_programmable_backend(|| async { (404, "not here".to_string()) }).await;

    let err = fetcher().fetch(&format!("http://{}", addr)).await.unwrap_err();
    assert!(matches!(err, IdentityError::Status(404)));
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let (addr, _) = common::start_mock_agent("<html>nope</html>").await;

    let err = fetcher().fetch(&format!("http://{}", addr)).await.unwrap_err();
    assert!(matches!(err, IdentityError::Malformed(_)));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let (addr, _) = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, PEER_CARD.to_string())
    })
    .await;

    let config = IdentityConfig {
        fetch_timeout_secs: 1,
        ..IdentityConfig::default()
    };
    let fetcher = HttpCardFetcher::new(&config).unwrap();

    let err = fetcher.fetch(&format!("http://{}", addr)).await.unwrap_err();
    assert!(matches!(err, IdentityError::Timeout));
}

#[tokio::test]
async fn test_cache_fetches_once_per_ttl() {
    let (addr, hits) = common::start_mock_agent(PEER_CARD).await;
    let admission = Arc::new(AdmissionController::new(RateLimitConfig::default()));
    let cache = AgentCardCache::new(fetcher(), Duration::from_secs(300), admission);
    let cancel = CancellationToken::new();
    let host_uri = format!("http://{}", addr);

    for _ in 0..3 {
        let card = cache.resolve_identity(&host_uri, &cancel).await.unwrap();
        assert_eq!(card.name, "Peer Agent");
    }

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}
