//! The seam between the manager and its upstream sources.

use std::future::Future;

use crate::domain::StationCode;

use super::error::ProviderError;

/// Something that can look up one report for a station.
///
/// Any error means "try the next source"; the manager never surfaces
/// individual source errors to its callers.
pub trait ReportSource: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &str;

    /// Fetch the report for `code`.
    fn fetch(
        &self,
        code: &StationCode,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}
