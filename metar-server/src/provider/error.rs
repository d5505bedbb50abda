//! Provider error types.

use crate::decoder::DecodeError;

/// Errors from fetching or decoding one upstream report.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-2xx status
    #[error("upstream {url} returned status {status}")]
    Status { status: u16, url: String },

    /// Body could not be decoded with the configured selector
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: DecodeError,
    },

    /// Body decoded but held no report
    #[error("no report in response from {url}")]
    NotFound { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::Status {
            status: 503,
            url: "https://example.com/EGLL".into(),
        };
        assert_eq!(
            err.to_string(),
            "upstream https://example.com/EGLL returned status 503"
        );

        let err = ProviderError::NotFound {
            url: "https://example.com/EGLL".into(),
        };
        assert_eq!(
            err.to_string(),
            "no report in response from https://example.com/EGLL"
        );
    }
}
