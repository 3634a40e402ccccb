//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (admission, edge limits, API key, tracing, request ID)
//! - Apply configuration reloads to the admission controller
//! - Serve until shutdown, cancelling in-flight identity fetches

use axum::{
    extract::{MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AgentConfig;
use crate::http::a2a;
use crate::http::request::ConnectionAddrs;
use crate::identity::{AgentCardCache, HttpCardFetcher, IdentityError};
use crate::observability::metrics;
use crate::security::admission::AdmissionController;
use crate::security::auth::{api_key_middleware, edge_limit_middleware};
use crate::security::edge_limit::EdgeRateLimiter;
use crate::security::rate_limit::admission_middleware;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AgentConfig>,
    pub admission: Arc<AdmissionController>,
    pub edge: Arc<EdgeRateLimiter>,
    pub identity: Arc<AgentCardCache>,
    /// Parent of every identity fetch token; cancelled on shutdown.
    pub cancel: CancellationToken,
}

impl AppState {
    pub fn new(config: AgentConfig) -> Result<Self, IdentityError> {
        let admission = Arc::new(AdmissionController::new(config.rate_limit.clone()));
        let edge = Arc::new(EdgeRateLimiter::new(&config.edge_limit));
        let identity = Arc::new(AgentCardCache::new(
            HttpCardFetcher::new(&config.identity)?,
            Duration::from_secs(config.identity.ttl_secs),
            admission.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            admission,
            edge,
            identity,
            cancel: CancellationToken::new(),
        })
    }
}

/// HTTP server for the resume agent.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AgentConfig) -> Result<Self, IdentityError> {
        let state = AppState::new(config)?;
        let router = build_router(state.clone());
        Ok(Self { router, state })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server on `listener` until `shutdown` is cancelled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AgentConfig>,
        shutdown: CancellationToken,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let admission = self.state.admission.clone();
        let reload_shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => admission.update_limits(config.rate_limit),
                        None => break,
                    },
                    _ = reload_shutdown.cancelled() => break,
                }
            }
        });

        let fetches = self.state.cancel.clone();
        let signal = async move {
            shutdown.cancelled().await;
            fetches.cancel();
            tracing::info!("HTTP server draining");
        };

        let app = self
            .router
            .into_make_service_with_connect_info::<ConnectionAddrs>();

        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

    let a2a_routes = Router::new()
        .route("/a2a/ask", post(a2a::ask))
        .route_layer(middleware::from_fn_with_state(
            state.admission.clone(),
            admission_middleware,
        ));

    let edge_routes = Router::new()
        .route("/api/a2a/ask", post(a2a::edge_ask))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(state.config.a2a.clone()),
            api_key_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.edge.clone(),
            edge_limit_middleware,
        ));

    Router::new()
        .route("/.well-known/agent.json", get(a2a::agent_card))
        .route("/health", get(a2a::health))
        .merge(a2a_routes)
        .merge(edge_routes)
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(track_requests))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Count every response by matched route and final status, rejections included.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    metrics::record_request(&route, response.status().as_u16());
    response
}
