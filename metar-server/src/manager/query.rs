//! The lookup pipeline: cache, coalesced fallback resolution, normalisation.

use chrono::{Local, Utc};
use futures::future;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::cache::ExpiringCache;
use crate::coalesce::Coalescer;
use crate::config::ProviderConfig;
use crate::domain::{ReportKind, StationCode};
use crate::provider::{Provider, ReportSource};

use super::config::ManagerConfig;
use super::error::QueryError;
use super::normalize::normalize;
use super::schedule::next_refresh;

/// Outcome of a resolution as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A normalised report.
    Found(String),

    /// Every source was tried and none had a report.
    Absent,
}

/// Serves lookups for one report kind from an ordered list of sources.
///
/// Owns its sources and its cache; closing the manager stops the cache
/// sweeper.
pub struct Manager<S = Provider> {
    kind: ReportKind,
    sources: Vec<S>,
    cache: ExpiringCache<Lookup>,
    in_flight: Coalescer<StationCode, Result<String, QueryError>>,
    batch_limit: usize,
}

impl Manager<Provider> {
    /// Build a manager from the provider configs of `kind`, keeping their
    /// declared order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        kind: ReportKind,
        configs: &[ProviderConfig],
        http: &reqwest::Client,
        config: &ManagerConfig,
    ) -> Self {
        let providers = configs
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| Provider::new(c, http.clone()))
            .collect();

        Self::with_sources(kind, providers, config)
    }
}

impl<S: ReportSource> Manager<S> {
    /// Create a manager over arbitrary sources, tried in the given order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_sources(kind: ReportKind, sources: Vec<S>, config: &ManagerConfig) -> Self {
        Self {
            kind,
            sources,
            cache: ExpiringCache::new(config.sweep_interval),
            in_flight: Coalescer::new(),
            batch_limit: config.effective_batch_limit(),
        }
    }

    /// The report kind this manager serves.
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Number of configured sources.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Look up the report for one station.
    ///
    /// Only [`QueryError::InvalidCode`] and [`QueryError::NotFound`] are ever
    /// returned; source errors are logged and the next source is tried.
    pub async fn query(&self, code: &str) -> Result<String, QueryError> {
        let code = StationCode::parse(code)?;

        if let Some(cached) = self.cached(&code) {
            return cached;
        }

        self.in_flight.run(code, || self.resolve(code)).await
    }

    /// Look up many stations concurrently.
    ///
    /// At most `batch_limit` lookups run at once. Failed lookups are left out
    /// of the result, and results come back in completion order, not input
    /// order.
    pub async fn batch_query<I>(&self, codes: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        stream::iter(codes)
            .map(|code| async move { self.query(code.as_ref()).await.ok() })
            .buffer_unordered(self.batch_limit)
            .filter_map(future::ready)
            .collect()
            .await
    }

    /// Stop the cache sweeper. Lookups keep working afterwards.
    pub async fn close(&self) {
        self.cache.close().await;
    }

    fn cached(&self, code: &StationCode) -> Option<Result<String, QueryError>> {
        self.cache.get(code.as_str()).map(|lookup| match lookup {
            Lookup::Found(report) => Ok(report),
            Lookup::Absent => Err(QueryError::NotFound(*code)),
        })
    }

    /// Walk the sources in order until one yields a report.
    async fn resolve(&self, code: StationCode) -> Result<String, QueryError> {
        // A resolution may have been published between our cache miss and
        // joining the in-flight table.
        if let Some(cached) = self.cached(&code) {
            return cached;
        }

        for source in &self.sources {
            match source.fetch(&code).await {
                Ok(report) => {
                    let report = normalize(&report);
                    debug!(kind = %self.kind, provider = source.name(), %code, "resolved report");
                    self.remember(&code, Lookup::Found(report.clone()));
                    return Ok(report);
                }
                Err(e) => {
                    debug!(kind = %self.kind, provider = source.name(), %code, error = %e, "provider failed, trying next");
                }
            }
        }

        info!(kind = %self.kind, %code, sources = self.sources.len(), "no provider has a report");
        self.remember(&code, Lookup::Absent);
        Err(QueryError::NotFound(code))
    }

    fn remember(&self, code: &StationCode, lookup: Lookup) {
        let expires_at = next_refresh(Local::now()).with_timezone(&Utc);
        self.cache.set(code.as_str(), lookup, expires_at);
    }
}
