//! Application configuration
//!
//! Loaded from a TOML file. Every section and field has a default, so an
//! empty file (or no file at all) yields a working setup.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//! shutdown_timeout = 30
//!
//! [database]
//! url = "sqlite://./rentapi.db?mode=rwc"
//! max_connections = 10
//! connect_timeout_secs = 5
//!
//! [logging]
//! level = "info"
//! format = "text"   # or "json"
//!
//! [reservations]
//! store_timeout_ms = 5000
//! payment_timeout_minutes = 30
//! scheduler_interval_secs = 60
//! auto_advance = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{ReservationSettings, SchedulerSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub reservations: ReservationsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: "sqlite://./rentapi.db?mode=rwc".to_string(),
            max_connections: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl DatabaseSection {
    /// `DATABASE_URL` wins over the configured url.
    pub fn connection_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error; `RUST_LOG` overrides it
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationsConfig {
    /// Upper bound on any single store call
    pub store_timeout_ms: u64,
    /// Unpaid reservations are cancelled after this long
    pub payment_timeout_minutes: i64,
    pub scheduler_interval_secs: u64,
    /// Start and complete rentals automatically at their boundaries
    pub auto_advance: bool,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: 5000,
            payment_timeout_minutes: 30,
            scheduler_interval_secs: 60,
            auto_advance: true,
        }
    }
}

/// One week; an unpaid hold longer than that is a misconfiguration.
pub const MAX_PAYMENT_TIMEOUT_MINUTES: i64 = 7 * 24 * 60;

impl ReservationsConfig {
    pub fn settings(&self) -> ReservationSettings {
        ReservationSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
        }
    }

    pub fn scheduler(&self) -> SchedulerSettings {
        SchedulerSettings {
            payment_timeout: chrono::Duration::minutes(
                self.payment_timeout_minutes
                    .clamp(1, MAX_PAYMENT_TIMEOUT_MINUTES),
            ),
            auto_advance: self.auto_advance,
            interval: Duration::from_secs(self.scheduler_interval_secs),
        }
    }
}

impl AppConfig {
    /// Read and validate a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.reservations;
        if r.store_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "reservations.store_timeout_ms",
                reason: "must be positive".into(),
            });
        }
        if r.payment_timeout_minutes <= 0 {
            return Err(ConfigError::Invalid {
                field: "reservations.payment_timeout_minutes",
                reason: "must be positive".into(),
            });
        }
        if r.payment_timeout_minutes > MAX_PAYMENT_TIMEOUT_MINUTES {
            return Err(ConfigError::Invalid {
                field: "reservations.payment_timeout_minutes",
                reason: format!("must be at most {}", MAX_PAYMENT_TIMEOUT_MINUTES),
            });
        }
        if r.scheduler_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "reservations.scheduler_interval_secs",
                reason: "must be positive".into(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_connections",
                reason: "must be positive".into(),
            });
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::Invalid {
                field: "logging.format",
                reason: format!("expected \"text\" or \"json\", got {:?}", self.logging.format),
            });
        }
        Ok(())
    }
}

/// `<config dir>/rentapi/config.toml`, e.g. `~/.config/rentapi/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rentapi")
        .join("config.toml")
}
