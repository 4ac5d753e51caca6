use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::finance::{
    AffordabilityPolicy, RegionTaxError, RegionTaxTable, DEFAULT_PMI_RATE_PERCENT,
    DEFAULT_TAX_RATE_PERCENT, DEFAULT_TARGET_DEBT_TO_INCOME_PERCENT,
    STANDARD_DOWN_PAYMENT_SWEEP,
};
use crate::listing::InsightsSettings;

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
    pub insights: InsightsConfig,
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

        let insights = InsightsConfig {
            tax_rates_csv: env::var("INSIGHTS_TAX_RATES_CSV").ok().map(PathBuf::from),
            default_tax_rate_percent: parse_var(
                "INSIGHTS_DEFAULT_TAX_RATE",
                DEFAULT_TAX_RATE_PERCENT,
            )?,
            target_debt_to_income_percent: parse_var(
                "INSIGHTS_TARGET_DTI",
                DEFAULT_TARGET_DEBT_TO_INCOME_PERCENT,
            )?,
            pmi_rate_percent: parse_var("INSIGHTS_PMI_RATE", DEFAULT_PMI_RATE_PERCENT)?,
            interest_rate_annual_percent: parse_var("INSIGHTS_INTEREST_RATE", 6.5)?,
            loan_term_years: parse_var("INSIGHTS_LOAN_TERM_YEARS", 30)?,
            cache_ttl_secs: parse_var("INSIGHTS_CACHE_TTL_SECS", 3600)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            insights,
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        _ => Ok(default),
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

/// Tracing controls. Colour output is only enabled for local development.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Calculator defaults and the tax table source.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsConfig {
    pub tax_rates_csv: Option<PathBuf>,
    pub default_tax_rate_percent: f64,
    pub target_debt_to_income_percent: f64,
    pub pmi_rate_percent: f64,
    pub interest_rate_annual_percent: f64,
    pub loan_term_years: u32,
    pub cache_ttl_secs: u64,
}

impl InsightsConfig {
    pub fn settings(&self) -> InsightsSettings {
        InsightsSettings {
            interest_rate_annual_percent: self.interest_rate_annual_percent,
            loan_term_years: self.loan_term_years,
            pmi_rate_percent: self.pmi_rate_percent,
            affordability: AffordabilityPolicy {
                target_debt_to_income_percent: self.target_debt_to_income_percent,
            },
            sweep: STANDARD_DOWN_PAYMENT_SWEEP.to_vec(),
            ..InsightsSettings::default()
        }
    }

    /// The configured CSV table, or the compiled state table when no file is set.
    pub fn tax_table(&self) -> Result<RegionTaxTable, RegionTaxError> {
        match &self.tax_rates_csv {
            Some(path) => RegionTaxTable::from_path(path, self.default_tax_rate_percent),
            None => Ok(RegionTaxTable::us_states()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be numeric, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
