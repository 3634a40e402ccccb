//! Cache-aside resolution of agent cards.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::identity::caller::RequestContext;
use crate::identity::card::AgentCard;
use crate::identity::fetcher::{CardFetcher, HttpCardFetcher};
use crate::identity::IdentityError;
use crate::observability::metrics;
use crate::security::admission::AdmissionController;

/// A resolved card and the instant it stops being usable.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub card: AgentCard,
    /// `None` when the TTL reaches past the clock's range.
    pub expires_at: Option<Instant>,
}

impl CacheEntry {
    pub fn new(card: AgentCard, now: Instant, ttl: Duration) -> Self {
        Self {
            card,
            expires_at: now.checked_add(ttl),
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now <= expires_at)
    }
}

#[derive(Debug, Default)]
struct SlotState {
    entry: Option<CacheEntry>,
    last_error: Option<String>,
}

/// Per-host slot. The async lock doubles as the single-flight guard.
#[derive(Debug, Default)]
struct Slot {
    state: Mutex<SlotState>,
    /// Bumped under the lock on every failed fetch. A waiter that sees it
    /// move while queued shares that failure instead of fetching again.
    failures: AtomicU64,
}

/// Resolves peer agent cards, keyed by `scheme://host`.
pub struct AgentCardCache<F = HttpCardFetcher> {
    fetcher: F,
    ttl: Duration,
    entries: DashMap<String, Arc<Slot>>,
    admission: Arc<AdmissionController>,
}

impl<F: CardFetcher> AgentCardCache<F> {
    pub fn new(fetcher: F, ttl: Duration, admission: Arc<AdmissionController>) -> Self {
        Self {
            fetcher,
            ttl,
            entries: DashMap::new(),
            admission,
        }
    }

    /// Identify the agent behind an inbound request.
    ///
    /// Returns `None` for our own traffic and on any failure; failures are
    /// logged and never surface to the caller.
    pub async fn resolve_caller_identity(
        &self,
        ctx: &RequestContext,
        cancel: &CancellationToken,
    ) -> Option<AgentCard> {
        let Some(host_uri) = ctx.host_uri() else {
            tracing::debug!(host = ?ctx.host, "Caller host unresolvable, skipping identity lookup");
            return None;
        };

        if ctx.is_self_referential() {
            tracing::debug!(
                remote_ip = ?ctx.remote_ip,
                host = %host_uri,
                "Local caller, skipping identity lookup"
            );
            metrics::record_identity_lookup("skipped");
            return None;
        }

        match self.resolve_identity(&host_uri, cancel).await {
            Ok(card) => {
                let client = ctx
                    .remote_ip
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let quota = self.admission.rate_limit_info(&client);
                tracing::info!(
                    caller = %card.name,
                    description = %card.description,
                    host = %host_uri,
                    client = %client,
                    per_minute_remaining = quota.per_minute_remaining,
                    per_day_remaining = quota.per_day_remaining,
                    global_remaining = quota.global_remaining,
                    "A2A caller identified"
                );
                Some(card)
            }
            Err(e) => {
                tracing::error!(host = %host_uri, error = %e, "Failed to resolve caller identity");
                None
            }
        }
    }

    /// Return the card for `host_uri`, fetching it on a miss or after expiry.
    ///
    /// Fetch failures propagate and leave any previous entry in place.
    /// Lookups queued behind a failing fetch get its error without
    /// fetching again.
    pub async fn resolve_identity(
        &self,
        host_uri: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentCard, IdentityError> {
        let slot = self
            .entries
            .entry(host_uri.to_string())
            .or_default()
            .value()
            .clone();

        let result = self.resolve_in_slot(&slot, host_uri, cancel).await;
        if result.is_err() {
            self.discard_if_empty(host_uri, &slot);
        }
        result
    }

    async fn resolve_in_slot(
        &self,
        slot: &Slot,
        host_uri: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentCard, IdentityError> {
        let failures_seen = slot.failures.load(Ordering::Acquire);

        let mut state = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(IdentityError::Cancelled),
            guard = slot.state.lock() => guard,
        };

        if let Some(cached) = state.entry.as_ref().filter(|e| e.is_fresh(Instant::now())) {
            metrics::record_identity_lookup("hit");
            return Ok(cached.card.clone());
        }

        if slot.failures.load(Ordering::Acquire) != failures_seen {
            if let Some(reason) = &state.last_error {
                metrics::record_identity_lookup("error");
                return Err(IdentityError::Shared(reason.clone()));
            }
        }

        metrics::record_identity_lookup("miss");
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(IdentityError::Cancelled),
            result = self.fetcher.fetch(host_uri) => result,
        };

        match fetched {
            Ok(card) => {
                state.entry = Some(CacheEntry::new(card.clone(), Instant::now(), self.ttl));
                state.last_error = None;
                Ok(card)
            }
            // A cancelled lookup says nothing about the peer.
            Err(IdentityError::Cancelled) => Err(IdentityError::Cancelled),
            Err(e) => {
                metrics::record_identity_lookup("error");
                state.last_error = Some(e.to_string());
                slot.failures.fetch_add(1, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Drop a slot that never held a card, unless another lookup is using it.
    fn discard_if_empty(&self, host_uri: &str, slot: &Arc<Slot>) {
        let empty = slot
            .state
            .try_lock()
            .is_ok_and(|state| state.entry.is_none());
        if empty {
            self.entries
                .remove_if(host_uri, |_, current| Arc::ptr_eq(current, slot));
        }
    }

    /// Number of hosts with a slot, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
