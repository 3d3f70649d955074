use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::reports::policy::LeavePolicy;
use crate::reports::render::DEFAULT_ROWS_PER_PAGE;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub report_timeout_secs: u64,
    pub report_rows_per_page: usize,
    pub leave_policy: LeavePolicy,
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/staffops".to_string()),
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_or("PORT", 8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            report_timeout_secs: parsed_or("REPORT_TIMEOUT_SECS", 30),
            report_rows_per_page: parsed_or("REPORT_ROWS_PER_PAGE", DEFAULT_ROWS_PER_PAGE),
            leave_policy: LeavePolicy::with_overrides(|key| env::var(key).ok()),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Upper bound on one report composition; `None` when set to zero.
    pub fn report_timeout(&self) -> Option<Duration> {
        (self.report_timeout_secs > 0).then(|| Duration::from_secs(self.report_timeout_secs))
    }
}
