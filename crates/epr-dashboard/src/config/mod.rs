use crate::registry::{DEFAULT_RECORD_LIMIT, MAX_RECORD_LIMIT};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_API_URL: &str =
    "https://eprplastic.cpcb.gov.in/epr/api/v1.0/pibo/fetch_pibo_application_details_by_status";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub registry: RegistryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            registry: RegistryConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// How the dashboard endpoint is reached and how long results are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub accept_invalid_certs: bool,
    pub default_record_limit: u32,
    pub cache_ttl_secs: Option<u64>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: true,
            default_record_limit: DEFAULT_RECORD_LIMIT,
            cache_ttl_secs: None,
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_record_limit = parse_var("REGISTRY_DEFAULT_RECORD_LIMIT")?
            .unwrap_or(defaults.default_record_limit);
        if !(1..=MAX_RECORD_LIMIT).contains(&default_record_limit) {
            return Err(ConfigError::RecordLimitOutOfRange {
                value: default_record_limit,
            });
        }

        Ok(Self {
            api_url: env::var("REGISTRY_API_URL").unwrap_or(defaults.api_url),
            user_agent: env::var("REGISTRY_USER_AGENT").unwrap_or(defaults.user_agent),
            timeout_secs: parse_var("REGISTRY_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
            accept_invalid_certs: parse_flag("REGISTRY_ACCEPT_INVALID_CERTS")?
                .unwrap_or(defaults.accept_invalid_certs),
            default_record_limit,
            cache_ttl_secs: parse_var("REGISTRY_CACHE_TTL_SECS")?,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        _ => Ok(None),
    }
}

fn parse_flag(key: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(Some(true)),
                "0" | "false" | "no" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::InvalidFlag { key, value: raw }),
            }
        }
        _ => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidFlag { key: &'static str, value: String },
    RecordLimitOutOfRange { value: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer, got '{value}'")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false, got '{value}'")
            }
            ConfigError::RecordLimitOutOfRange { value } => write!(
                f,
                "REGISTRY_DEFAULT_RECORD_LIMIT must be between 1 and {MAX_RECORD_LIMIT}, got {value}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. }
            | ConfigError::RecordLimitOutOfRange { .. } => None,
        }
    }
}

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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "REGISTRY_API_URL",
            "REGISTRY_USER_AGENT",
            "REGISTRY_TIMEOUT_SECS",
            "REGISTRY_ACCEPT_INVALID_CERTS",
            "REGISTRY_DEFAULT_RECORD_LIMIT",
            "REGISTRY_CACHE_TTL_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.registry, RegistryConfig::default());
        assert_eq!(config.registry.timeout(), Duration::from_secs(60));
        assert!(config.registry.accept_invalid_certs);
        assert!(config.registry.cache_ttl().is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn registry_overrides_are_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REGISTRY_API_URL", "http://127.0.0.1:9999/stub");
        env::set_var("REGISTRY_TIMEOUT_SECS", "5");
        env::set_var("REGISTRY_ACCEPT_INVALID_CERTS", "false");
        env::set_var("REGISTRY_CACHE_TTL_SECS", "300");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.registry.api_url, "http://127.0.0.1:9999/stub");
        assert_eq!(config.registry.timeout(), Duration::from_secs(5));
        assert!(!config.registry.accept_invalid_certs);
        assert_eq!(config.registry.cache_ttl(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn invalid_registry_values_are_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REGISTRY_TIMEOUT_SECS", "soon");
        let error = AppConfig::load().expect_err("timeout rejected");
        reset_env();
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                key: "REGISTRY_TIMEOUT_SECS",
                ..
            }
        ));

        env::set_var("REGISTRY_ACCEPT_INVALID_CERTS", "maybe");
        let error = AppConfig::load().expect_err("flag rejected");
        reset_env();
        assert!(error.to_string().contains("REGISTRY_ACCEPT_INVALID_CERTS"));
    }

    #[test]
    fn default_record_limit_must_be_in_range() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        for raw in ["0", "200001", "300000"] {
            reset_env();
            env::set_var("REGISTRY_DEFAULT_RECORD_LIMIT", raw);
            let error = AppConfig::load().expect_err("limit rejected");
            reset_env();
            assert!(
                matches!(error, ConfigError::RecordLimitOutOfRange { .. }),
                "{raw} should be out of range, got {error:?}"
            );
        }

        env::set_var("REGISTRY_DEFAULT_RECORD_LIMIT", "200000");
        let config = AppConfig::load().expect("upper bound accepted");
        reset_env();
        assert_eq!(config.registry.default_record_limit, 200_000);
    }
}
