use crate::workflows::eligibility::DeferralPolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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

/// Top-level configuration for the donor service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub eligibility: EligibilityPolicyConfig,
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
            telemetry: TelemetryConfig {
                log_level,
                include_targets: environment != AppEnvironment::Production,
            },
            eligibility: EligibilityPolicyConfig::from_env()?,
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
    pub include_targets: bool,
}

/// Operator-tunable deferral windows and the travel risk-region table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityPolicyConfig {
    pub pregnancy_deferral_days: Option<i64>,
    pub travel_risk_deferral_days: Option<i64>,
    pub risk_regions: Vec<String>,
}

impl EligibilityPolicyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let pregnancy_deferral_days = window_days("ELIGIBILITY_PREGNANCY_DEFERRAL_DAYS")?;
        let travel_risk_deferral_days = window_days("ELIGIBILITY_TRAVEL_DEFERRAL_DAYS")?;
        let risk_regions = env::var("ELIGIBILITY_RISK_REGIONS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|region| !region.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            pregnancy_deferral_days,
            travel_risk_deferral_days,
            risk_regions,
        })
    }

    pub fn policy(&self) -> DeferralPolicy {
        let mut policy = DeferralPolicy::default().with_risk_regions(&self.risk_regions);
        if let Some(days) = self.pregnancy_deferral_days {
            policy = policy.with_pregnancy_deferral_days(days);
        }
        if let Some(days) = self.travel_risk_deferral_days {
            policy = policy.with_travel_risk_deferral_days(days);
        }
        policy
    }
}

fn window_days(variable: &'static str) -> Result<Option<i64>, ConfigError> {
    match env::var(variable) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(days) if days > 0 => Ok(Some(days)),
            _ => Err(ConfigError::InvalidWindow { variable, value: raw }),
        },
        Err(_) => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWindow { variable: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWindow { variable, value } => {
                write!(f, "{variable} must be a positive number of days, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidWindow { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
