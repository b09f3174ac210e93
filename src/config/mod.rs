use crate::filter::FilterRules;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding `upstream.status_url`
pub const ENV_STATUS_URL: &str = "ROOMTEMP_STATUS_URL";
/// Environment variable overriding `upstream.auth_token`
pub const ENV_AUTH_TOKEN: &str = "ROOMTEMP_AUTH_TOKEN";

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub filter: FilterRules,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream status API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamConfig {
    /// Full URL of the states endpoint (e.g., "http://ha.local:8123/api/states")
    #[serde(default)]
    pub status_url: String,
    /// Long-lived access token sent as a Bearer token
    #[serde(default)]
    pub auth_token: String,
}

/// Entity cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// How long an entity stays visible after its last refresh (seconds)
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

fn default_cache_ttl() -> u64 {
    3 * 60 * 60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Refresh loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Delay between upstream fetches (seconds)
    #[serde(default = "default_refresh_interval")]
    pub interval_seconds: u64,
}

fn default_refresh_interval() -> u64 {
    60
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_refresh_interval(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl AppConfig {
    /// Override upstream settings from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_STATUS_URL).filter(|v| !v.is_empty()) {
            self.upstream.status_url = v;
        }
        if let Some(v) = lookup(ENV_AUTH_TOKEN).filter(|v| !v.is_empty()) {
            self.upstream.auth_token = v;
        }
    }

    /// Reject settings the service cannot run with.
    ///
    /// Entity patterns are deliberately not checked here: a bad pattern fails
    /// each refresh cycle instead of the process.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.status_url.trim().is_empty() {
            bail!("upstream.status_url must be set (or {})", ENV_STATUS_URL);
        }
        if self.cache.ttl_seconds == 0 {
            bail!("cache.ttl_seconds must be greater than zero");
        }
        if self.refresh.interval_seconds == 0 {
            bail!("refresh.interval_seconds must be greater than zero");
        }
        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read config file {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("unable to parse config file {}", path.display()))?;
    Ok(config)
}
