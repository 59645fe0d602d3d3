//! Shared application state handed to every axum handler.

use std::sync::Arc;
use std::time::Duration;

use mdgate_cache::{CacheLayer, CacheTtls};
use mdgate_config::Settings;
use mdgate_gateway::{Orchestrator, SessionGate};
use mdgate_store::{CacheStore, InMemoryCacheStore, InMemorySessionStore, SessionStore};
use mdgate_upstream::{HttpUpstreamClient, UpstreamClient};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub gate: Arc<SessionGate>,
    pub orchestrator: Arc<Orchestrator>,
    pub upstream: Arc<dyn UpstreamClient>,
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(config: Settings, metrics_handle: PrometheusHandle) -> Self {
        let session_store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let cache_store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
        Self::with_stores(config, session_store, cache_store, metrics_handle)
    }

    pub fn with_stores(
        config: Settings,
        session_store: Arc<dyn SessionStore>,
        cache_store: Arc<dyn CacheStore>,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let gate = Arc::new(SessionGate::new(
            session_store,
            config.session.timeout_minutes as i64,
            config.rate_limit.requests,
            config.rate_limit.window_seconds as i64,
        ));

        let ttls = CacheTtls {
            price_seconds: config.cache.ttl_price_seconds,
            historical_seconds: config.cache.ttl_historical_seconds,
            indicator_seconds: config.cache.ttl_indicator_seconds,
        };
        let cache = Arc::new(CacheLayer::new(cache_store, ttls));

        let upstream: Arc<dyn UpstreamClient> = Arc::new(HttpUpstreamClient::new(
            config.upstream.url.clone(),
            Duration::from_secs(config.upstream.timeout_seconds),
        ));

        let orchestrator = Arc::new(Orchestrator::new(gate.clone(), cache, upstream.clone()));

        Self {
            config: Arc::new(config),
            gate,
            orchestrator,
            upstream,
            metrics_handle,
        }
    }
}
