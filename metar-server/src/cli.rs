//! Command-line flags. Every flag can also be set from the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::manager::ManagerConfig;

/// METAR/TAF lookup service
#[derive(Debug, Parser)]
#[command(name = "metar-server", version, about = "METAR and TAF lookup service")]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "CONFIG_FILE_PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Maximum concurrent lookups in a batch query.
    #[arg(long, env = "QUERY_THREAD", default_value_t = 16)]
    pub thread: usize,

    /// Seconds between cache sweeps.
    #[arg(long, env = "CACHE_CLEAN_INTERVAL", default_value_t = 1800)]
    pub cache_clean_interval: u64,

    /// Upstream request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 10)]
    pub request_timeout: u64,

    /// Gzip compression level, 0-9.
    #[arg(long, env = "GZIP_LEVEL", default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub gzip_level: u8,

    /// Disable log output.
    #[arg(long, env = "NO_LOGS")]
    pub no_logs: bool,
}

impl Cli {
    /// Manager settings derived from the flags.
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::new(self.thread, Duration::from_secs(self.cache_clean_interval))
    }

    /// Timeout applied to every upstream request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
