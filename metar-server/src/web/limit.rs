//! Per-client request limiting.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Period the configured request budget applies to, and how often idle keys
/// are purged.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

type Keyed<C> =
    RateLimiter<String, DashMapStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Allows `per_minute` requests per key, refilling evenly across the minute.
///
/// Keys are opaque; the router uses client IP plus request path.
pub struct KeyedLimiter<C: Clock = DefaultClock> {
    limiter: Keyed<C>,
}

impl KeyedLimiter {
    /// Limiter on the system clock. `None` when `per_minute` is 0, which
    /// disables limiting.
    pub fn per_minute(per_minute: u32) -> Option<Self> {
        Self::with_clock(per_minute, &DefaultClock::default())
    }
}

impl<C: Clock> KeyedLimiter<C> {
    /// Limiter on an explicit clock.
    pub fn with_clock(per_minute: u32, clock: &C) -> Option<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute)?);
        Some(Self {
            limiter: RateLimiter::dashmap_with_clock(quota, clock),
        })
    }

    /// Record a request for `key`, returning whether it is allowed.
    pub fn allow(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_owned()).is_ok()
    }

    /// Forget keys whose budget has fully refilled.
    pub fn cleanup(&self) {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        let removed = before.saturating_sub(self.limiter.len());
        if removed > 0 {
            debug!(removed, remaining = self.limiter.len(), "purged idle rate limit keys");
        }
    }

    /// Number of tracked keys.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

impl<C> KeyedLimiter<C>
where
    C: Clock + Send + Sync + 'static,
    C::Instant: Send + Sync,
{
    /// Run [`cleanup`](Self::cleanup) every `interval` until `shutdown` fires.
    pub fn spawn_cleanup(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // First tick is immediate, skip it
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => limiter.cleanup(),
                }
            }
        })
    }
}
