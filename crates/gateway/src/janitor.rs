//! Background sweeps for expired sessions and expired cache rows. Shaped
//! after the teacher's `SessionManager::start_cleanup_task`: an interval
//! timer paired with a `watch` channel so the caller can ask it to stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::session_gate::SessionGate;
use mdgate_cache::CacheLayer;

pub struct JanitorHandle {
    shutdown: watch::Sender<bool>,
}

impl JanitorHandle {
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }
}

pub fn spawn_session_janitor(gate: Arc<SessionGate>, interval: Duration) -> JanitorHandle {
    let (tx, mut rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match gate.run_janitor_once(chrono::Utc::now()).await {
                        Ok(removed) if removed > 0 => {
                            tracing::info!(removed, "session janitor removed expired sessions");
                        }
                        Ok(_) => {}
                        Err(err) => tracing::warn!(error = %err, "session janitor sweep failed"),
                    }
                }
                _ = rx.changed() => {
                    if *rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
    JanitorHandle { shutdown: tx }
}

pub fn spawn_cache_janitor(cache: Arc<CacheLayer>, interval: Duration) -> JanitorHandle {
    let (tx, mut rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match cache.run_janitor_once().await {
                        Ok(removed) if removed > 0 => {
                            tracing::info!(removed, "cache janitor removed expired rows");
                        }
                        Ok(_) => {}
                        Err(err) => tracing::warn!(error = %err, "cache janitor sweep failed"),
                    }
                }
                _ = rx.changed() => {
                    if *rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
    JanitorHandle { shutdown: tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdgate_store::{InMemoryCacheStore, InMemorySessionStore};

    #[tokio::test]
    async fn session_janitor_can_be_stopped() {
        let gate = Arc::new(SessionGate::new(Arc::new(InMemorySessionStore::new()), 60, 30, 60));
        let handle = spawn_session_janitor(gate, Duration::from_millis(10));
        handle.stop();
    }

    #[tokio::test]
    async fn cache_janitor_can_be_stopped() {
        let cache = Arc::new(CacheLayer::new(Arc::new(InMemoryCacheStore::new()), mdgate_cache::CacheTtls::default()));
        let handle = spawn_cache_janitor(cache, Duration::from_millis(10));
        handle.stop();
    }
}
