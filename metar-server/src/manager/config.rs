//! Manager configuration.

use std::time::Duration;

use crate::cache::DEFAULT_SWEEP_INTERVAL;

/// Default number of concurrent lookups in a batch query.
pub const DEFAULT_BATCH_LIMIT: usize = 16;

/// Configuration for a [`Manager`](super::Manager).
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Maximum lookups in flight during a batch query. 0 means the default.
    pub batch_limit: usize,

    /// How often the cache sweeps expired entries. Zero means the default.
    pub sweep_interval: Duration,
}

impl ManagerConfig {
    /// Create a configuration with the given parameters.
    pub fn new(batch_limit: usize, sweep_interval: Duration) -> Self {
        Self {
            batch_limit,
            sweep_interval,
        }
    }

    /// Batch limit with the default substituted for 0.
    pub fn effective_batch_limit(&self) -> usize {
        if self.batch_limit == 0 {
            DEFAULT_BATCH_LIMIT
        } else {
            self.batch_limit
        }
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
