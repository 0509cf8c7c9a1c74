use crate::errors::BotError;
use chrono::{Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Process-wide daily request ceiling. The gate itself is passive: `check`
/// admits or refuses, `record` is called only after a successful backend
/// dispatch (so a failed call never consumes quota), and `reset` is driven by
/// an external schedule.
pub struct QuotaGate {
    daily_limit: u32,
    used: AtomicU32,
}

impl QuotaGate {
    pub fn new(daily_limit: u32) -> Self {
        Self {
            daily_limit,
            used: AtomicU32::new(0),
        }
    }

    /// Admit a request iff serving it keeps the day within `daily_limit`
    /// total requests. No mutation.
    pub fn check(&self) -> Result<(), BotError> {
        let used = self.used.load(Ordering::SeqCst);
        // Equivalent to `used + 1 <= daily_limit` without the overflow hazard
        if used < self.daily_limit {
            Ok(())
        } else {
            warn!(used, limit = self.daily_limit, "daily quota exhausted");
            Err(BotError::QuotaExceeded)
        }
    }

    /// Count one served request.
    pub fn record(&self) {
        self.used.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        let previous = self.used.swap(0, Ordering::SeqCst);
        info!(requests_served = previous, "daily quota counter reset");
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }
}

/// Reset the quota gate once per day, anchored to `reset_hour` (UTC).
pub fn spawn_daily_reset(quota: Arc<QuotaGate>, reset_hour: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = seconds_until_hour(reset_hour);
            tokio::time::sleep(tokio::time::Duration::from_secs(wait)).await;
            quota.reset();
        }
    })
}

fn seconds_until_hour(hour: u32) -> u64 {
    let now = Utc::now();
    let mut next = now
        .date_naive()
        .and_hms_opt(hour.min(23), 0, 0)
        .unwrap_or_else(|| now.naive_utc())
        .and_utc();
    if next <= now {
        next += Duration::days(1);
    }
    // Round up so we never fire just before the anchor
    (next - now).num_seconds().max(0) as u64 + 1
}
