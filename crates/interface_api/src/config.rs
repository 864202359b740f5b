//! API configuration

use std::time::Duration;

use serde::Deserialize;

use core_kernel::{CalendarError, Currency, Timezone};
use domain_subscription::GatePolicy;

/// API configuration
///
/// Every field has a default, so an empty environment starts a local
/// server backed by the in-memory store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// PostgreSQL URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    /// Log level
    pub log_level: String,
    /// IANA name of the business timezone
    pub timezone: String,
    /// Currency of installments and reports
    pub currency: Currency,
    /// Days after the 1st during which an unpaid month shows the grace banner
    pub grace_days: u32,
    /// Days before month end that show the approaching-due banner
    pub approaching_window: u32,
    /// Interval of the pending-verification poll
    pub poll_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let policy = GatePolicy::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: None,
            log_level: "info".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            currency: Currency::BRL,
            grace_days: policy.grace_days,
            approaching_window: policy.approaching_window,
            poll_interval_secs: 15,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timezone(&self) -> Result<Timezone, CalendarError> {
        self.timezone.parse()
    }

    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy {
            grace_days: self.grace_days,
            approaching_window: self.approaching_window,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}
