use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

/// Serves room temperatures collected from a Home Assistant status API.
#[derive(Parser, Debug)]
#[command(name = "roomtemp", version, about)]
pub struct Opts {
    /// Path of the TOML configuration file
    #[arg(long, env = "ROOMTEMP_CONFIG")]
    pub config: PathBuf,

    /// Listening port for the web server (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Seconds to keep entities in the cache (overrides cache.ttl_seconds)
    #[arg(long = "cache-ttl", value_name = "SECONDS")]
    pub cache_ttl: Option<u64>,

    /// Seconds between upstream status fetches (overrides refresh.interval_seconds)
    #[arg(long = "refresh-interval", value_name = "SECONDS")]
    pub refresh_interval: Option<u64>,
}

impl Opts {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ttl) = self.cache_ttl {
            config.cache.ttl_seconds = ttl;
        }
        if let Some(interval) = self.refresh_interval {
            config.refresh.interval_seconds = interval;
        }
    }
}
