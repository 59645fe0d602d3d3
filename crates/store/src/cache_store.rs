//! Persistent store adapter for cache rows. Fresh/stale TTL logic lives in
//! `mdgate-cache`; this layer only persists and retrieves rows by key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRow {
    pub key: String,
    pub query_type: String,
    pub response_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheRow>>;

    /// Upsert semantics: replaces any existing row at the same key.
    async fn set(&self, row: CacheRow) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<bool>;

    async fn clear_all(&self) -> Result<u64>;

    /// Deletes rows whose `created_at + ttl_seconds < now`. Used by the
    /// background janitor.
    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64>;

    async fn stats(&self) -> Result<CacheStats>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub by_type: std::collections::HashMap<String, u64>,
    pub expired_entries: u64,
    pub active_entries: u64,
}

#[derive(Default)]
pub struct InMemoryCacheStore {
    rows: DashMap<String, CacheRow>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self { rows: DashMap::new() }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheRow>> {
        Ok(self.rows.get(key).map(|r| r.clone()))
    }

    async fn set(&self, row: CacheRow) -> Result<()> {
        self.rows.insert(row.key.clone(), row);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.rows.remove(key).is_some())
    }

    async fn clear_all(&self) -> Result<u64> {
        let count = self.rows.len() as u64;
        self.rows.clear();
        Ok(count)
    }

    async fn delete_expired_before(&self, now: DateTime<Utc>) -> Result<u64> {
        let expired: Vec<String> = self
            .rows
            .iter()
            .filter(|r| r.created_at + chrono::Duration::seconds(r.ttl_seconds as i64) < now)
            .map(|r| r.key().clone())
            .collect();
        let mut removed = 0u64;
        for key in expired {
            if self.rows.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now();
        let mut by_type = std::collections::HashMap::new();
        let mut expired = 0u64;
        for row in self.rows.iter() {
            *by_type.entry(row.query_type.clone()).or_insert(0u64) += 1;
            if row.created_at + chrono::Duration::seconds(row.ttl_seconds as i64) < now {
                expired += 1;
            }
        }
        let total = self.rows.len() as u64;
        Ok(CacheStats {
            total_entries: total,
            by_type,
            expired_entries: expired,
            active_entries: total - expired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, age_seconds: i64, ttl: u64) -> CacheRow {
        CacheRow {
            key: key.to_string(),
            query_type: "price".to_string(),
            response_data: serde_json::json!({"price": 100.0}),
            created_at: Utc::now() - chrono::Duration::seconds(age_seconds),
            ttl_seconds: ttl,
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryCacheStore::new();
        store.set(row("k1", 0, 45)).await.unwrap();
        assert!(store.get("k1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_expired_before_removes_only_expired_rows() {
        let store = InMemoryCacheStore::new();
        store.set(row("fresh", 10, 45)).await.unwrap();
        store.set(row("stale", 1000, 45)).await.unwrap();
        let removed = store.delete_expired_before(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("fresh").await.unwrap().is_some());
        assert!(store.get("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn stats_reports_active_and_expired_counts() {
        let store = InMemoryCacheStore::new();
        store.set(row("fresh", 10, 45)).await.unwrap();
        store.set(row("stale", 1000, 45)).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.active_entries, 1);
    }
}
