//! Session lifecycle on top of the store: creation, lookup with expiry
//! semantics, quota consumption and context tracking. Mirrors the operations
//! the teacher's `SessionManager` exposes over its own session store, adapted
//! to the market-data session shape.

use std::sync::Arc;

use chrono::{Duration, Utc};
use mdgate_core::{push_context, CoreError, Session, TurnContextEntry};
use mdgate_store::SessionStore;

pub struct SessionGate {
    store: Arc<dyn SessionStore>,
    timeout: Duration,
    rate_limit_requests: u32,
    rate_limit_window: Duration,
}

pub enum GetOutcome {
    Found(Session),
    NotFound,
    Expired,
}

impl SessionGate {
    pub fn new(
        store: Arc<dyn SessionStore>,
        timeout_minutes: i64,
        rate_limit_requests: u32,
        rate_limit_window_seconds: i64,
    ) -> Self {
        Self {
            store,
            timeout: Duration::minutes(timeout_minutes),
            rate_limit_requests,
            rate_limit_window: Duration::seconds(rate_limit_window_seconds),
        }
    }

    pub async fn create(
        &self,
        user_id: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<Session, CoreError> {
        let session = Session::new(user_id, metadata, Utc::now());
        self.store.create(session.clone()).await?;
        Ok(session)
    }

    pub async fn get(&self, id: &str) -> Result<GetOutcome, CoreError> {
        let Some(session) = self.store.get(id).await? else {
            return Ok(GetOutcome::NotFound);
        };
        if session.is_expired(Utc::now(), self.timeout) {
            return Ok(GetOutcome::Expired);
        }
        Ok(GetOutcome::Found(session))
    }

    pub async fn touch(&self, id: &str) -> Result<(), CoreError> {
        let now = Utc::now();
        self.store
            .update(
                id,
                Box::new(move |s| {
                    s.last_activity = now;
                }),
            )
            .await?;
        Ok(())
    }

    /// Atomically consumes one unit of quota, resetting the window if it has
    /// elapsed. Returns `(current_count, seconds_until_reset)`.
    pub async fn consume_quota(&self, id: &str) -> Result<(u32, u64), CoreError> {
        let now = Utc::now();
        let window = self.rate_limit_window;
        let updated = self
            .store
            .update(
                id,
                Box::new(move |s| {
                    if now - s.request_window_start >= window {
                        s.request_count = 1;
                        s.request_window_start = now;
                    } else {
                        s.request_count += 1;
                    }
                }),
            )
            .await?
            .ok_or(CoreError::SessionNotFound)?;

        let elapsed = now - updated.request_window_start;
        let remaining = (window - elapsed).num_seconds().max(0) as u64;
        Ok((updated.request_count, remaining))
    }

    pub fn is_over_limit(&self, count: u32) -> bool {
        count > self.rate_limit_requests
    }

    pub fn rate_limit_requests(&self) -> u32 {
        self.rate_limit_requests
    }

    pub async fn append_context(&self, id: &str, entry: TurnContextEntry) -> Result<(), CoreError> {
        self.store
            .update(
                id,
                Box::new(move |s| {
                    push_context(&mut s.context, entry);
                }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.store.delete(id).await?)
    }

    pub async fn list_sessions_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<Session>, CoreError> {
        let now = Utc::now();
        let timeout = self.timeout;
        let sessions = self.store.list_by_user(user_id, limit).await?;
        Ok(sessions
            .into_iter()
            .filter(|s| !s.is_expired(now, timeout))
            .collect())
    }

    /// Deletes sessions whose `last_activity` is at least `timeout` in the
    /// past. Returns the count removed.
    pub async fn run_janitor_once(&self, now: chrono::DateTime<Utc>) -> Result<u64, CoreError> {
        let cutoff = now - self.timeout;
        Ok(self.store.delete_inactive_since(cutoff).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgate_core::Intent;
    use mdgate_store::InMemorySessionStore;

    fn gate() -> SessionGate {
        SessionGate::new(Arc::new(InMemorySessionStore::new()), 60, 30, 60)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let gate = gate();
        let session = gate.create(None, None).await.unwrap();
        match gate.get(&session.id).await.unwrap() {
            GetOutcome::Found(s) => assert_eq!(s.id, session.id),
            _ => panic!("expected session to be found"),
        }
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let gate = gate();
        assert!(matches!(gate.get("nope").await.unwrap(), GetOutcome::NotFound));
    }

    #[tokio::test]
    async fn consume_quota_resets_after_window_elapses() {
        let gate = SessionGate::new(Arc::new(InMemorySessionStore::new()), 60, 2, 60);
        let session = gate.create(None, None).await.unwrap();
        let (count, _) = gate.consume_quota(&session.id).await.unwrap();
        assert_eq!(count, 1);
        let (count, _) = gate.consume_quota(&session.id).await.unwrap();
        assert_eq!(count, 2);
        let (count, _) = gate.consume_quota(&session.id).await.unwrap();
        assert_eq!(count, 3);
        assert!(gate.is_over_limit(count));
    }

    #[tokio::test]
    async fn append_context_is_observable_on_next_get() {
        let gate = gate();
        let session = gate.create(None, None).await.unwrap();
        gate.append_context(
            &session.id,
            TurnContextEntry {
                query: "price of gold".to_string(),
                symbols: vec!["XAU/USD".to_string()],
                intent: Intent::Price,
                indicator: None,
                interval: None,
                timestamp: Utc::now(),
            },
        )
        .await
        .unwrap();

        match gate.get(&session.id).await.unwrap() {
            GetOutcome::Found(s) => assert_eq!(s.context.len(), 1),
            _ => panic!("expected session to be found"),
        }
    }

    #[tokio::test]
    async fn janitor_removes_only_inactive_sessions() {
        let gate = gate();
        let fresh = gate.create(None, None).await.unwrap();
        let stale = gate.create(None, None).await.unwrap();
        gate.store
            .update(
                &stale.id,
                Box::new(|s| {
                    s.last_activity = Utc::now() - Duration::hours(2);
                }),
            )
            .await
            .unwrap();

        let removed = gate.run_janitor_once(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert!(matches!(gate.get(&fresh.id).await.unwrap(), GetOutcome::Found(_)));
        assert!(matches!(gate.get(&stale.id).await.unwrap(), GetOutcome::NotFound));
    }
}
