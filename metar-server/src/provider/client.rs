//! HTTP-backed report source.

use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::decoder::{Decoder, DecoderKind, LineSelection};
use crate::domain::StationCode;

use super::error::ProviderError;
use super::source::ReportSource;

/// One configured upstream endpoint plus its decoding strategy.
///
/// Issues a single GET per lookup with no retry. Timeouts are whatever the
/// shared `reqwest::Client` was built with.
#[derive(Debug, Clone)]
pub struct Provider {
    name: String,
    target: String,
    decoder: DecoderKind,
    selector: String,
    lines: LineSelection,
    http: reqwest::Client,
}

impl Provider {
    /// Create a provider from its configuration and a shared HTTP client.
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            name: config.name.clone(),
            target: config.target.clone(),
            decoder: config.decoder,
            selector: config.selector.clone(),
            lines: config.line_selection(),
            http,
        }
    }

    /// The upstream URL for a station.
    pub fn url_for(&self, code: &StationCode) -> String {
        self.target.replacen("%s", code.as_str(), 1)
    }

    /// Fetch and decode the report for a station.
    pub async fn get(&self, code: &StationCode) -> Result<String, ProviderError> {
        let url = self.url_for(code);
        debug!(provider = %self.name, %url, "fetching report");

        let response = self.http.get(&url).send().await.inspect_err(|e| {
            warn!(provider = %self.name, %url, error = %e, "request failed");
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(provider = %self.name, %url, %status, "upstream returned error status");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await.inspect_err(|e| {
            warn!(provider = %self.name, %url, error = %e, "failed to read response body");
        })?;

        let decoded = self
            .decoder
            .decode(trim_trailing_newlines(&body), &self.selector, &self.lines);

        match decoded {
            Ok(Some(report)) => Ok(report),
            Ok(None) => {
                debug!(provider = %self.name, %url, "no report in response");
                Err(ProviderError::NotFound { url })
            }
            Err(source) => {
                warn!(provider = %self.name, %url, error = %source, "decoding failed");
                Err(ProviderError::Decode { url, source })
            }
        }
    }
}

impl ReportSource for Provider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, code: &StationCode) -> Result<String, ProviderError> {
        self.get(code).await
    }
}

/// Strip trailing `\n` and `\r` bytes.
fn trim_trailing_newlines(body: &[u8]) -> &[u8] {
    let end = body
        .iter()
        .rposition(|b| !matches!(b, b'\n' | b'\r'))
        .map_or(0, |i| i + 1);
    &body[..end]
}
