//! TTL cache layer. Keys are a SHA256 hash of `(query_type, canonical_params)`;
//! TTL is selected per query type; stale reads are an explicit opt-in so the
//! orchestrator can serve degraded-but-present data when the upstream fails.

use std::sync::Arc;

use chrono::Utc;
use mdgate_store::{CacheRow, CacheStats, CacheStore};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub price_seconds: u64,
    pub historical_seconds: u64,
    pub indicator_seconds: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            price_seconds: 45,
            historical_seconds: 300,
            indicator_seconds: 300,
        }
    }
}

impl CacheTtls {
    fn for_type(&self, query_type: &str) -> u64 {
        match query_type {
            "price" | "quote" => self.price_seconds,
            "historical" | "indicator" => self.historical_seconds,
            _ => self.price_seconds,
        }
    }
}

/// A cache read: the stored payload, plus staleness metadata when the entry
/// has outlived its TTL and was returned anyway via `allow_stale`.
#[derive(Debug, Clone)]
pub struct CacheHit {
    pub data: serde_json::Value,
    pub stale: bool,
    pub cached_at: chrono::DateTime<Utc>,
}

pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    ttls: CacheTtls,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, ttls: CacheTtls) -> Self {
        Self { store, ttls }
    }

    /// `sha256(query_type + ":" + canonical_json(params))`. `params` must
    /// serialize as a JSON object; `serde_json`'s default (non
    /// `preserve_order`) map type sorts keys, which gives the deterministic
    /// canonical form the key derivation depends on.
    pub fn cache_key(query_type: &str, params: &serde_json::Value) -> String {
        let sorted = serde_json::to_string(params).unwrap_or_default();
        let key_string = format!("{query_type}:{sorted}");
        let mut hasher = Sha256::new();
        hasher.update(key_string.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn get(
        &self,
        query_type: &str,
        params: &serde_json::Value,
        allow_stale: bool,
    ) -> mdgate_store::Result<Option<CacheHit>> {
        let key = Self::cache_key(query_type, params);
        let row = self.store.get(&key).await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let age = Utc::now() - row.created_at;
        let is_stale = age.num_seconds() as u64 > row.ttl_seconds;

        if is_stale && !allow_stale {
            return Ok(None);
        }

        Ok(Some(CacheHit {
            data: row.response_data,
            stale: is_stale,
            cached_at: row.created_at,
        }))
    }

    pub async fn set(
        &self,
        query_type: &str,
        params: &serde_json::Value,
        response_data: serde_json::Value,
    ) -> mdgate_store::Result<String> {
        let key = Self::cache_key(query_type, params);
        let ttl = self.ttls.for_type(query_type);
        self.store
            .set(CacheRow {
                key: key.clone(),
                query_type: query_type.to_string(),
                response_data,
                created_at: Utc::now(),
                ttl_seconds: ttl,
            })
            .await?;
        Ok(key)
    }

    pub async fn invalidate(&self, query_type: &str, params: &serde_json::Value) -> mdgate_store::Result<bool> {
        let key = Self::cache_key(query_type, params);
        self.store.delete(&key).await
    }

    pub async fn clear_all(&self) -> mdgate_store::Result<u64> {
        self.store.clear_all().await
    }

    pub async fn stats(&self) -> mdgate_store::Result<CacheStats> {
        self.store.stats().await
    }

    /// Deletes rows past TTL. Invoked by the background janitor on
    /// `cache.cleanup_interval_minutes`.
    pub async fn run_janitor_once(&self) -> mdgate_store::Result<u64> {
        self.store.delete_expired_before(Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgate_store::InMemoryCacheStore;

    fn layer() -> CacheLayer {
        CacheLayer::new(Arc::new(InMemoryCacheStore::new()), CacheTtls::default())
    }

    #[test]
    fn cache_key_is_deterministic_under_key_reordering() {
        let a = serde_json::json!({"symbol": "AAPL", "interval": "1day"});
        let b = serde_json::json!({"interval": "1day", "symbol": "AAPL"});
        assert_eq!(CacheLayer::cache_key("price", &a), CacheLayer::cache_key("price", &b));
    }

    #[test]
    fn cache_key_differs_by_query_type() {
        let p = serde_json::json!({"symbol": "AAPL"});
        assert_ne!(CacheLayer::cache_key("price", &p), CacheLayer::cache_key("quote", &p));
    }

    #[tokio::test]
    async fn fresh_entry_is_returned_as_a_hit() {
        let cache = layer();
        let params = serde_json::json!({"symbol": "AAPL"});
        cache.set("price", &params, serde_json::json!({"price": 100.0})).await.unwrap();
        let hit = cache.get("price", &params, false).await.unwrap().unwrap();
        assert!(!hit.stale);
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_without_allow_stale() {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = CacheLayer::new(store.clone(), CacheTtls::default());
        store
            .set(CacheRow {
                key: CacheLayer::cache_key("price", &serde_json::json!({"symbol": "AAPL"})),
                query_type: "price".to_string(),
                response_data: serde_json::json!({"price": 100.0}),
                created_at: Utc::now() - chrono::Duration::seconds(120),
                ttl_seconds: 45,
            })
            .await
            .unwrap();

        let params = serde_json::json!({"symbol": "AAPL"});
        assert!(cache.get("price", &params, false).await.unwrap().is_none());
        let stale_hit = cache.get("price", &params, true).await.unwrap().unwrap();
        assert!(stale_hit.stale);
    }

    #[tokio::test]
    async fn historical_ttl_is_longer_than_price_ttl() {
        let ttls = CacheTtls::default();
        assert!(ttls.for_type("historical") > ttls.for_type("price"));
        assert_eq!(ttls.for_type("quote"), ttls.for_type("price"));
    }
}
