//! Application configuration loaded from a YAML file.
//!
//! Every section has defaults, so a file only needs to list its providers.
//! The provider list keeps its declared order: within one report kind, the
//! first configured source is tried first.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::filter::LevelFilter;

use crate::decoder::{DecoderKind, LineSelection};
use crate::domain::ReportKind;

/// Default path of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid YAML for the expected shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Config parsed but failed validation
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Root of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub global: GlobalConfig,
    pub server: ServerConfig,

    /// Upstream sources, in fallback order.
    #[serde(rename = "provider")]
    pub providers: Vec<ProviderConfig>,
}

impl AppConfig {
    /// Read, parse and verify a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse and verify config from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        config.verify()?;
        Ok(config)
    }

    /// Check every section.
    pub fn verify(&self) -> Result<(), ConfigError> {
        self.global.log.verify()?;
        self.server.http.verify()?;
        for provider in &self.providers {
            provider.verify()?;
        }
        Ok(())
    }

    /// Providers serving `kind`, in declared order.
    pub fn providers_of(&self, kind: ReportKind) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(move |p| p.kind == kind)
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub log: LogConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level filter, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Parsed level filter.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.level)))
    }

    fn verify(&self) -> Result<(), ConfigError> {
        self.level_filter().map(|_| ())
    }
}

/// Server settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http: HttpServerConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    /// Listen address (an IP address).
    pub host: String,

    pub port: u16,

    /// Requests allowed per client and path per minute. 0 disables limiting.
    pub rate_limit: u32,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            rate_limit: 20,
        }
    }
}

impl HttpServerConfig {
    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("host {:?} is not an IP address", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    fn verify(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("http host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("http port must be larger than 0".to_string()));
        }
        self.socket_addr().map(|_| ())
    }
}

/// One upstream source.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Report family this source serves.
    #[serde(rename = "type")]
    pub kind: ReportKind,

    pub name: String,

    /// URL template; the first `%s` is replaced with the station code.
    pub target: String,

    pub decoder: DecoderKind,

    /// CSS selector (html) or JSONPath (json). Ignored by raw.
    #[serde(default)]
    pub selector: String,

    /// Keep the last segment instead of the first.
    #[serde(default)]
    pub reverse: bool,

    /// Segment delimiter for multi-line bodies.
    #[serde(default)]
    pub multiline: Option<String>,
}

impl ProviderConfig {
    /// Create a provider config with no selector and no line splitting.
    pub fn new(
        kind: ReportKind,
        name: impl Into<String>,
        target: impl Into<String>,
        decoder: DecoderKind,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            target: target.into(),
            decoder,
            selector: String::new(),
            reverse: false,
            multiline: None,
        }
    }

    /// Set the selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Split on `delimiter`, keeping the last segment when `reverse` is set.
    pub fn with_multiline(mut self, delimiter: impl Into<String>, reverse: bool) -> Self {
        self.multiline = Some(delimiter.into());
        self.reverse = reverse;
        self
    }

    /// The line selection this provider applies after extraction.
    pub fn line_selection(&self) -> LineSelection {
        LineSelection::new(self.reverse, self.multiline.clone())
    }

    /// Validate the provider entry.
    pub fn verify(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("provider name is required".to_string()));
        }
        if self.target.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "provider {} needs a target",
                self.name
            )));
        }
        if !self.target.contains("%s") {
            return Err(ConfigError::Invalid(format!(
                "provider {} target must contain %s",
                self.name
            )));
        }
        if self.decoder.needs_selector() && self.selector.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "provider {} with decoder {:?} needs a selector",
                self.name, self.decoder
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXAMPLE: &str = r##"
global:
  log:
    level: debug
server:
  http:
    host: 127.0.0.1
    port: 9000
    rate_limit: 0
provider:
  - type: metar
    name: aviationweather
    target: https://aviationweather.gov/api/data/metar?ids=%s
    decoder: raw
    multiline: "\n"
  - type: taf
    name: taf-json
    target: https://example.com/taf/%s.json
    decoder: json
    selector: $.data
    reverse: true
  - type: metar
    name: metar-html
    target: https://example.com/metar?code=%s
    decoder: html
    selector: "#metar"
"##;

    #[test]
    fn parse_full_example() {
        let config = AppConfig::from_yaml(EXAMPLE).unwrap();

        assert_eq!(config.global.log.level, "debug");
        assert_eq!(config.server.http.port, 9000);
        assert_eq!(config.server.http.rate_limit, 0);
        assert_eq!(config.providers.len(), 3);

        let first = &config.providers[0];
        assert_eq!(first.kind, ReportKind::Metar);
        assert_eq!(first.decoder, DecoderKind::Raw);
        assert_eq!(first.multiline.as_deref(), Some("\n"));
        assert!(!first.reverse);

        let taf = &config.providers[1];
        assert_eq!(taf.selector, "$.data");
        assert!(taf.reverse);
        assert_eq!(taf.multiline, None);

        let html = &config.providers[2];
        assert_eq!(html.decoder, DecoderKind::Html);
        assert_eq!(html.selector, "#metar");
    }

    #[test]
    fn providers_of_kind_keep_declared_order() {
        let config = AppConfig::from_yaml(EXAMPLE).unwrap();

        let metar: Vec<&str> = config
            .providers_of(ReportKind::Metar)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(metar, vec!["aviationweather", "metar-html"]);

        let taf: Vec<&str> = config
            .providers_of(ReportKind::Taf)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(taf, vec!["taf-json"]);
    }

    #[test]
    fn defaults_for_empty_file() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(config.global.log.level, "info");
        assert_eq!(config.server.http.host, "0.0.0.0");
        assert_eq!(config.server.http.port, 8080);
        assert_eq!(config.server.http.rate_limit, 20);
        assert!(config.providers.is_empty());
    }

    #[test]
    fn socket_addr_from_host_and_port() {
        let config = AppConfig::from_yaml(EXAMPLE).unwrap();
        let addr = config.server.http.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn reject_selectorless_html_provider() {
        let yaml = r#"
provider:
  - type: metar
    name: page
    target: https://example.com/%s
    decoder: html
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("needs a selector"));
    }

    #[test]
    fn reject_target_without_placeholder() {
        let provider = ProviderConfig::new(
            ReportKind::Taf,
            "static",
            "https://example.com/taf",
            DecoderKind::Raw,
        );
        let err = provider.verify().unwrap_err();
        assert!(err.to_string().contains("must contain %s"));
    }

    #[test]
    fn reject_unknown_decoder_and_kind() {
        let yaml = r#"
provider:
  - type: sigmet
    name: x
    target: https://example.com/%s
    decoder: raw
"#;
        assert!(matches!(
            AppConfig::from_yaml(yaml),
            Err(ConfigError::Parse(_))
        ));

        let yaml = r#"
provider:
  - type: metar
    name: x
    target: https://example.com/%s
    decoder: xml
"#;
        assert!(matches!(
            AppConfig::from_yaml(yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn reject_bad_server_and_log_settings() {
        let err = AppConfig::from_yaml("server:\n  http:\n    port: 0\n").unwrap_err();
        assert!(err.to_string().contains("port"));

        let err = AppConfig::from_yaml("server:\n  http:\n    host: example.com\n").unwrap_err();
        assert!(err.to_string().contains("not an IP address"));

        let err = AppConfig::from_yaml("global:\n  log:\n    level: loud\n").unwrap_err();
        assert!(err.to_string().contains("unknown log level"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, EXAMPLE).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.providers.len(), 3);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AppConfig::load("/nonexistent/metar/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/metar/config.yaml"));
    }

    #[test]
    fn builder_sets_line_selection() {
        let provider = ProviderConfig::new(
            ReportKind::Metar,
            "raw",
            "https://example.com/%s",
            DecoderKind::Raw,
        )
        .with_multiline("\n", true);

        assert_eq!(
            provider.line_selection(),
            LineSelection::new(true, Some("\n".to_string()))
        );
        assert!(provider.verify().is_ok());
    }
}
