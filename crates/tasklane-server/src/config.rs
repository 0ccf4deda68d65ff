//! Server configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`tasklane.toml` in the working directory, or the path in
//! `TASKLANE_CONFIG`), then environment variables of the form
//! `TASKLANE__<SECTION>__<KEY>`, e.g. `TASKLANE__POOL__WORKERS=4`.

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tasklane_worker::PoolConfig;
use thiserror::Error;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "TASKLANE_CONFIG";

/// Base name of the configuration file looked up by default.
pub const DEFAULT_CONFIG_FILE: &str = "tasklane";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "TASKLANE";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("invalid configuration '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub pool: PoolSettings,
    pub rate_limit: RateLimitSettings,
    pub cache: CacheSettings,
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    /// Address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ConfigError::invalid("server.host", format!("{}: {e}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Worker pool running cache jobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    pub workers: usize,
    pub queue_capacity: usize,
    pub drain_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        let defaults = PoolConfig::default();
        Self {
            workers: defaults.workers,
            queue_capacity: defaults.queue_capacity,
            drain_timeout_secs: defaults.drain_timeout.as_secs(),
        }
    }
}

impl PoolSettings {
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.workers, self.queue_capacity)
            .with_drain_timeout(Duration::from_secs(self.drain_timeout_secs))
    }
}

/// Per-client sliding window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Requests admitted per client within one window.
    pub requests: usize,
    pub window_secs: u64,
    /// Whole windows a client must be idle before it is forgotten.
    pub idle_windows: u32,
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            requests: 100,
            window_secs: 60,
            idle_windows: 3,
            sweep_interval_secs: 60,
        }
    }
}

impl RateLimitSettings {
    /// The request limit; zero is rejected by validation.
    pub fn limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.requests)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Task snapshot cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            max_capacity: 10_000,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl AppConfig {
    /// Loads configuration from `path` (or the default file, if present)
    /// and the environment, then validates it.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config: AppConfig = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text only.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the components cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.workers == 0 {
            return Err(ConfigError::invalid("pool.workers", "must be at least 1"));
        }
        if self.rate_limit.requests == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.requests",
                "must be at least 1",
            ));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.window_secs",
                "must be at least 1",
            ));
        }
        if self.rate_limit.idle_windows == 0 {
            return Err(ConfigError::invalid(
                "rate_limit.idle_windows",
                "must be at least 1",
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::invalid("cache.ttl_secs", "must be at least 1"));
        }
        self.server.socket_addr()?;
        Ok(())
    }
}
