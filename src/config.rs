//! Configuration management for Bookdesk server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
    /// Account created when the store starts without demo data
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LendingConfig {
    /// Loan period used when a reservation is fulfilled
    pub loan_period_days: i64,
    /// Days a pending reservation stays valid
    pub reservation_hold_days: i64,
    /// Fine charged per overdue day, in cents
    pub fine_per_day_cents: i64,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Load the demonstration catalog, members and accounts at startup
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub lending: LendingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix BOOKDESK_)
            .add_source(
                Environment::with_prefix("BOOKDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Override JWT secret from JWT_SECRET env var if present
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the lending rules cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lending = &self.lending;
        if lending.loan_period_days < 1 {
            return Err(invalid("lending.loan_period_days must be at least 1"));
        }
        if lending.reservation_hold_days < 1 {
            return Err(invalid("lending.reservation_hold_days must be at least 1"));
        }
        if lending.fine_per_day_cents < 0 {
            return Err(invalid("lending.fine_per_day_cents cannot be negative"));
        }
        if lending.max_page_size < 1 {
            return Err(invalid("lending.max_page_size must be at least 1"));
        }
        if !(1..=lending.max_page_size).contains(&lending.default_page_size) {
            return Err(invalid("lending.default_page_size must be between 1 and lending.max_page_size"));
        }
        if self.auth.jwt_expiration_hours < 1 {
            return Err(invalid("auth.jwt_expiration_hours must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Message(message.to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-this-secret-in-production".to_string(),
            jwt_expiration_hours: 24,
            bootstrap_admin_email: "admin@library.com".to_string(),
            bootstrap_admin_password: "admin123".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            reservation_hold_days: 7,
            fine_per_day_cents: 100,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_demo_data: true }
    }
}
