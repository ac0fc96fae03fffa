use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::contracts::ValidationPolicy;

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
    pub policy: ValidationPolicy,
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
            policy: load_policy()?,
        })
    }
}

fn load_policy() -> Result<ValidationPolicy, ConfigError> {
    let defaults = ValidationPolicy::default();

    Ok(ValidationPolicy {
        expiry_horizon_days: policy_var("HAKEN_EXPIRY_HORIZON_DAYS", defaults.expiry_horizon_days)?,
        max_dispatch_days: policy_var("HAKEN_MAX_DISPATCH_DAYS", defaults.max_dispatch_days)?,
        daily_overtime_limit_hours: policy_hours(
            "HAKEN_DAILY_OVERTIME_HOURS",
            defaults.daily_overtime_limit_hours,
        )?,
        monthly_overtime_limit_hours: policy_hours(
            "HAKEN_MONTHLY_OVERTIME_HOURS",
            defaults.monthly_overtime_limit_hours,
        )?,
        minimum_hourly_rate: policy_var("HAKEN_MINIMUM_HOURLY_RATE", defaults.minimum_hourly_rate)?,
    })
}

fn policy_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidPolicy { name }),
        Err(_) => Ok(default),
    }
}

// NaN would make every limit comparison false.
fn policy_hours(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let hours = policy_var(name, default)?;
    if hours.is_finite() && hours >= 0.0 {
        Ok(hours)
    } else {
        Err(ConfigError::InvalidPolicy { name })
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

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPolicy { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPolicy { name } => {
                write!(f, "{name} must be a non-negative number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidPolicy { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
