//! Shared Module
//!
//! Types shared across the auth/session core: configuration, the error
//! taxonomy, and the user/session data model. All types here are plain data
//! designed for serialization and for consumption by the UI layer.

/// Application configuration
pub mod config;

/// Shared error types
pub mod error;

/// User and session types
pub mod user;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::AuthError;
pub use user::{Credentials, RegisterData, Session, UserRecord, UserUpdate};
