//! Errors surfaced to callers of the manager.

use crate::domain::{InvalidStationCode, StationCode};

/// Why a lookup produced no report.
///
/// Individual source failures never appear here: they are logged and the
/// next source is tried. `Clone` so coalesced callers can share one outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Malformed station code; no I/O was performed
    #[error("invalid station code {0:?}")]
    InvalidCode(String),

    /// Every source failed, now or at the last resolution
    #[error("no report found for {0}")]
    NotFound(StationCode),
}

impl From<InvalidStationCode> for QueryError {
    fn from(err: InvalidStationCode) -> Self {
        QueryError::InvalidCode(err.input().to_string())
    }
}
