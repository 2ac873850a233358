use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_MAX_ENTRIES;

/// Distinguishes runtime behavior for different deployments of the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalEnvironment {
    Development,
    Test,
    Production,
}

impl PortalEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Human-oriented colored output only on developer machines.
    pub fn log_format(self) -> LogFormat {
        match self {
            Self::Development => LogFormat::Pretty,
            Self::Test | Self::Production => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
}

/// Top-level configuration for the portal client.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub environment: PortalEnvironment,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

impl PortalConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = PortalEnvironment::from_str(
            &env::var("PORTAL_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("PORTAL_API_URL")
            .unwrap_or_else(|_| "http://localhost:4000/api".to_string());
        require_scheme("PORTAL_API_URL", &base_url, &["http://", "https://"])?;

        let socket_url =
            env::var("PORTAL_SOCKET_URL").unwrap_or_else(|_| "ws://localhost:4000/ws".to_string());
        require_scheme("PORTAL_SOCKET_URL", &socket_url, &["ws://", "wss://"])?;

        let timeout_secs = parse_seconds("PORTAL_HTTP_TIMEOUT_SECS", 15)?;
        let cache_ttl_secs = parse_seconds("PORTAL_CACHE_TTL_SECS", 30)?;
        let cache_max_entries = parse_count("PORTAL_CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES)?;

        let state_dir = env::var("PORTAL_STATE_DIR").unwrap_or_else(|_| ".estate-portal".to_string());
        let log_level = env::var("PORTAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                socket_url,
                timeout: Duration::from_secs(timeout_secs),
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                cache_max_entries,
            },
            storage: StorageConfig {
                state_dir: PathBuf::from(state_dir),
            },
            telemetry: TelemetryConfig {
                log_level,
                format: environment.log_format(),
            },
        })
    }
}

fn require_scheme(var: &'static str, value: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let lowered = value.trim().to_ascii_lowercase();
    if schemes.iter().any(|scheme| lowered.starts_with(scheme)) {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            var,
            value: value.to_string(),
        })
    }
}

fn parse_seconds(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}

fn parse_count(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(var) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(ConfigError::InvalidCount { var }),
        },
        Err(_) => Ok(default),
    }
}

/// Where the backend lives and how long its answers stay fresh.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub socket_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

/// Location of the persisted client-side state.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub state_dir: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidUrl { var: &'static str, value: String },
    InvalidNumber { var: &'static str },
    InvalidCount { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidUrl { var, value } => {
                write!(f, "{var} has an unsupported scheme: '{value}'")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a whole number of seconds")
            }
            ConfigError::InvalidCount { var } => write!(f, "{var} must be a positive whole number"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for var in [
            "PORTAL_ENV",
            "PORTAL_API_URL",
            "PORTAL_SOCKET_URL",
            "PORTAL_LOG_LEVEL",
            "PORTAL_STATE_DIR",
            "PORTAL_HTTP_TIMEOUT_SECS",
            "PORTAL_CACHE_TTL_SECS",
            "PORTAL_CACHE_MAX_ENTRIES",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = PortalConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, PortalEnvironment::Development);
        assert_eq!(config.api.base_url, "http://localhost:4000/api");
        assert_eq!(config.api.socket_url, "ws://localhost:4000/ws");
        assert_eq!(config.api.timeout, Duration::from_secs(15));
        assert_eq!(config.api.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.api.cache_max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.telemetry.format, LogFormat::Pretty);
        assert_eq!(config.storage.state_dir, PathBuf::from(".estate-portal"));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn rejects_non_http_api_url() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORTAL_API_URL", "ftp://estates.example");
        let err = PortalConfig::load().expect_err("ftp is not a REST scheme");
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                var: "PORTAL_API_URL",
                ..
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_malformed_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORTAL_HTTP_TIMEOUT_SECS", "soon");
        let err = PortalConfig::load().expect_err("timeout must be numeric");
        assert_eq!(err.to_string(), "PORTAL_HTTP_TIMEOUT_SECS must be a whole number of seconds");
        reset_env();
    }

    #[test]
    fn production_aliases_are_recognised() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORTAL_ENV", "prod");
        env::set_var("PORTAL_SOCKET_URL", "wss://estates.example/ws");
        let config = PortalConfig::load().expect("config loads");
        assert_eq!(config.environment, PortalEnvironment::Production);
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.api.socket_url, "wss://estates.example/ws");
        reset_env();
    }

    #[test]
    fn cache_capacity_must_be_positive() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORTAL_CACHE_MAX_ENTRIES", "0");
        let err = PortalConfig::load().expect_err("empty cache is useless");
        assert!(matches!(
            err,
            ConfigError::InvalidCount {
                var: "PORTAL_CACHE_MAX_ENTRIES"
            }
        ));

        env::set_var("PORTAL_CACHE_MAX_ENTRIES", "64");
        let config = PortalConfig::load().expect("config loads");
        assert_eq!(config.api.cache_max_entries, 64);
        reset_env();
    }
}
