//! Application configuration module
//!
//! Provides configuration for the auth/session core: Auth API base URL,
//! session store location, and OTP challenge tuning.

use std::path::PathBuf;
use thiserror::Error;

/// Default Auth API base URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Default resend cooldown, matching the backend's re-issue window
const DEFAULT_OTP_COOLDOWN_SECS: u64 = 60;

/// Default challenge lifetime before a new login is required
const DEFAULT_OTP_TTL_SECS: i64 = 300;

/// Default verification attempts before the challenge is discarded
const DEFAULT_OTP_MAX_ATTEMPTS: u32 = 5;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Auth API base URL
    pub server_url: Option<String>,
    /// Session database path override (platform data dir when `None`)
    pub store_path: Option<PathBuf>,
    /// Seconds the `resend OTP` action stays a no-op after a send
    pub otp_cooldown_secs: u64,
    /// Seconds an OTP challenge stays verifiable
    pub otp_ttl_secs: i64,
    /// Verification attempts before the challenge is discarded
    pub otp_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: std::env::var("SHOPFRONT_API_URL").ok(),
            store_path: None,
            otp_cooldown_secs: DEFAULT_OTP_COOLDOWN_SECS,
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            otp_max_attempts: DEFAULT_OTP_MAX_ATTEMPTS,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// The configured Auth API base URL, or the default
    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    store_path: Option<PathBuf>,
    otp_cooldown_secs: Option<u64>,
    otp_ttl_secs: Option<i64>,
    otp_max_attempts: Option<u32>,
}

impl AppConfigBuilder {
    /// Set the Auth API base URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Set the session database path
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Set the OTP resend cooldown in seconds
    pub fn otp_cooldown_secs(mut self, secs: u64) -> Self {
        self.otp_cooldown_secs = Some(secs);
        self
    }

    /// Set the OTP challenge lifetime in seconds
    pub fn otp_ttl_secs(mut self, secs: i64) -> Self {
        self.otp_ttl_secs = Some(secs);
        self
    }

    /// Set the number of OTP verification attempts allowed
    pub fn otp_max_attempts(mut self, attempts: u32) -> Self {
        self.otp_max_attempts = Some(attempts);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        if let Some(url) = &self.server_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        let defaults = AppConfig::default();
        Ok(AppConfig {
            server_url: self.server_url.or(defaults.server_url),
            store_path: self.store_path,
            otp_cooldown_secs: self.otp_cooldown_secs.unwrap_or(defaults.otp_cooldown_secs),
            otp_ttl_secs: self.otp_ttl_secs.unwrap_or(defaults.otp_ttl_secs),
            otp_max_attempts: self.otp_max_attempts.unwrap_or(defaults.otp_max_attempts),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}
