//! Shared Error Types
//!
//! This module defines the error taxonomy for the auth/session core.
//!
//! # Error Categories
//!
//! - `Validation` - request rejected locally before reaching the Auth API
//! - `Application` - the backend explicitly rejected credentials or OTP
//! - `Transport` - no response reached the client (offline, refused, timeout)
//! - `InvalidResponse` - the backend replied 2xx but the payload was unusable
//! - `Store` - the local session database failed at the I/O level
//!
//! Corrupt persisted session data is deliberately NOT an error: the store
//! self-heals and reports the session as absent.
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread
//! boundaries.
use thiserror::Error;

/// Fixed user-facing message for transport-level failures.
///
/// Kept distinct from any application-level rejection message so the UI can
/// tell "server rejected" from "server unreachable" without string matching
/// (the variant itself is the tag).
pub const TRANSPORT_MESSAGE: &str = "No response from server. Please check your connection.";

/// Errors produced by the auth/session subsystem
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Request rejected before calling the Auth API
    #[error("Validation error in field '{field}': {message}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// The backend explicitly rejected the request
    #[error("{message}")]
    Application {
        /// Human-readable error message from the backend
        message: String,
    },

    /// No response reached the client
    #[error("{message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// The backend replied successfully but the payload was missing
    /// required fields (e.g. token without user)
    #[error("Invalid response from server")]
    InvalidResponse,

    /// Local session store I/O failure
    #[error("Session store error: {message}")]
    Store {
        /// Human-readable error message
        message: String,
    },
}

impl AuthError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new application error
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    /// Create a new transport error carrying the fixed user-facing message
    pub fn transport() -> Self {
        Self::Transport {
            message: TRANSPORT_MESSAGE.to_string(),
        }
    }

    /// Create a new store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Whether this failure happened below the application layer, so the UI
    /// may offer a retry
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        Self::store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = AuthError::validation("email", "Email is required");
        match error {
            AuthError::Validation { field, message } => {
                assert_eq!(field, "email");
                assert_eq!(message, "Email is required");
            }
            _ => panic!("Expected Validation"),
        }
    }

    #[test]
    fn test_transport_error_fixed_message() {
        let error = AuthError::transport();
        assert!(error.is_transport());
        assert_eq!(format!("{}", error), TRANSPORT_MESSAGE);
    }

    #[test]
    fn test_application_error_display_is_bare_message() {
        let error = AuthError::application("Invalid credentials");
        assert_eq!(format!("{}", error), "Invalid credentials");
        assert!(!error.is_transport());
    }

    #[test]
    fn test_invalid_response_display() {
        let display = format!("{}", AuthError::InvalidResponse);
        assert!(display.contains("Invalid response"));
    }

    #[test]
    fn test_error_clone() {
        let error = AuthError::validation("field", "message");
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
