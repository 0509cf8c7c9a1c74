use crate::session::store::SessionStore;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Periodically scans the session store and removes sessions whose idle time
/// exceeds the configured TTL. Runs off the request path; each removal is
/// independent, so one entry can never stop the sweep.
pub struct EvictionSweeper {
    store: Arc<SessionStore>,
    ttl: Duration,
    interval_s: u64,
    running: Arc<tokio::sync::Mutex<bool>>,
    handle: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl EvictionSweeper {
    pub fn new(store: Arc<SessionStore>, ttl: Duration, interval_s: u64) -> Self {
        Self {
            store,
            ttl,
            interval_s,
            running: Arc::new(tokio::sync::Mutex::new(false)),
            handle: tokio::sync::Mutex::new(None),
        }
    }

    /// One sweep pass against the current clock.
    pub async fn run_once(&self) -> usize {
        self.run_once_at(Utc::now()).await
    }

    /// One sweep pass, evaluated at `now`. Exposed for deterministic
    /// scheduling and tests.
    pub async fn run_once_at(&self, now: DateTime<Utc>) -> usize {
        Self::sweep(&self.store, self.ttl, now).await
    }

    async fn sweep(store: &SessionStore, ttl: Duration, now: DateTime<Utc>) -> usize {
        let snapshot = store.snapshot().await;
        let mut evicted = 0;

        for (user_id, session) in snapshot {
            let idle = now - session.idle_since();
            if idle <= ttl {
                continue;
            }
            if store.remove(&user_id).await.is_some() {
                evicted += 1;
                info!(
                    user_id,
                    idle_secs = idle.num_seconds(),
                    "evicted idle chat session"
                );
            }
        }

        if evicted > 0 {
            info!(evicted, "eviction sweep completed");
        } else {
            debug!("eviction sweep completed, nothing to evict");
        }
        evicted
    }

    pub async fn start(&self) -> Result<()> {
        *self.running.lock().await = true;

        let store = self.store.clone();
        let ttl = self.ttl;
        let interval = self.interval_s.max(1);
        let running = self.running.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
                if !*running.lock().await {
                    break;
                }
                Self::sweep(&store, ttl, Utc::now()).await;
            }
        });

        *self.handle.lock().await = Some(handle);
        info!(interval_s = interval, "eviction sweeper started");
        Ok(())
    }

    pub async fn stop(&self) {
        *self.running.lock().await = false;
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
        }
    }
}
