//! Application state for the web layer.

use std::sync::Arc;

use crate::domain::ReportKind;
use crate::manager::Manager;

use super::limit::KeyedLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Observation lookups
    pub metar: Arc<Manager>,

    /// Forecast lookups
    pub taf: Arc<Manager>,

    /// Per-client request limiter; `None` when limiting is disabled
    pub limiter: Option<Arc<KeyedLimiter>>,
}

impl AppState {
    /// Create state with no rate limiting.
    pub fn new(metar: Manager, taf: Manager) -> Self {
        Self {
            metar: Arc::new(metar),
            taf: Arc::new(taf),
            limiter: None,
        }
    }

    /// Allow `per_minute` requests per client and path. 0 disables limiting.
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.limiter = KeyedLimiter::per_minute(per_minute).map(Arc::new);
        self
    }

    /// The manager serving `kind`.
    pub fn manager(&self, kind: ReportKind) -> &Manager {
        match kind {
            ReportKind::Metar => &self.metar,
            ReportKind::Taf => &self.taf,
        }
    }

    /// Close both managers.
    pub async fn close(&self) {
        tokio::join!(self.metar.close(), self.taf.close());
    }
}
