//! Expiring in-memory cache.
//!
//! Every entry carries an absolute expiry. Reads hide expired entries at once
//! (lazy expiry); a background task periodically removes them so that keys
//! nobody asks for again do not pile up (eager expiry).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Sweep interval used when none (or zero) is configured.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// A cached value and the instant it stops being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem<V> {
    pub value: V,
    pub expires_at: DateTime<Utc>,
}

impl<V> CachedItem<V> {
    /// Whether the entry has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

type Entries<V> = Arc<RwLock<HashMap<String, CachedItem<V>>>>;

/// String-keyed cache with per-entry absolute expiry and a background sweeper.
///
/// Reads share the lock; writes and sweeps take it exclusively.
pub struct ExpiringCache<V> {
    entries: Entries<V>,
    sweep_interval: Duration,
    shutdown: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache and start its sweeper.
    ///
    /// Must be called from within a tokio runtime. A zero interval falls back
    /// to [`DEFAULT_SWEEP_INTERVAL`].
    pub fn new(sweep_interval: Duration) -> Self {
        let sweep_interval = if sweep_interval.is_zero() {
            DEFAULT_SWEEP_INTERVAL
        } else {
            sweep_interval
        };

        let entries: Entries<V> = Arc::default();
        let shutdown = CancellationToken::new();
        let sweeper = tokio::spawn(sweep_loop(
            Arc::clone(&entries),
            sweep_interval,
            shutdown.clone(),
        ));

        Self {
            entries,
            sweep_interval,
            shutdown,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Store `value` until `expires_at`.
    ///
    /// Ignored for an empty key or an expiry that has already passed.
    pub fn set(&self, key: &str, value: V, expires_at: DateTime<Utc>) {
        if key.is_empty() || expires_at <= Utc::now() {
            return;
        }
        self.entries
            .write()
            .insert(key.to_string(), CachedItem { value, expires_at });
    }

    /// Store `value` for `ttl` from now.
    pub fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.set(key, value, expires_at);
    }

    /// Look up a live entry.
    ///
    /// Expired entries are reported as absent even if no sweep has removed
    /// them yet.
    pub fn get(&self, key: &str) -> Option<V> {
        if key.is_empty() {
            return None;
        }
        let now = Utc::now();
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|item| !item.is_expired_at(now))
            .map(|item| item.value.clone())
    }

    /// Remove an entry.
    pub fn delete(&self, key: &str) {
        if key.is_empty() {
            return;
        }
        self.entries.write().remove(key);
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Remove every expired entry now. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        sweep_expired(&self.entries)
    }

    /// Interval between background sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Stop the sweeper and wait for it to finish.
    ///
    /// Safe to call more than once. The cache stays readable and writable
    /// afterwards; it just stops sweeping.
    pub async fn close(&self) {
        self.shutdown.cancel();
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "cache sweeper ended abnormally");
        }
    }
}

impl<V> Drop for ExpiringCache<V> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn sweep_loop<V>(entries: Entries<V>, period: Duration, shutdown: CancellationToken)
where
    V: Send + Sync,
{
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // First tick is immediate, skip it

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let removed = sweep_expired(&entries);
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        }
    }
}

fn sweep_expired<V>(entries: &RwLock<HashMap<String, CachedItem<V>>>) -> usize {
    let now = Utc::now();
    let mut entries = entries.write();
    let before = entries.len();
    entries.retain(|_, item| !item.is_expired_at(now));
    before - entries.len()
}
