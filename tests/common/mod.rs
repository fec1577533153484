//! Shared test helpers
//!
//! Wiremock fixtures and sample payloads used across the integration suite.
#![allow(dead_code)]

use serde_json::{json, Value};
use shopfront::shared::AppConfig;

/// Config pointing the controller at a mock Auth API
pub fn test_config(base_url: &str) -> AppConfig {
    AppConfig::builder()
        .server_url(base_url)
        .build()
        .expect("test config is valid")
}

/// The sample user the mock backend issues sessions for
pub fn user_json() -> Value {
    json!({"id": "42", "email": "a@b.com"})
}

/// A complete successful login body: token plus user
pub fn success_body() -> Value {
    json!({"token": "tkn", "user": user_json()})
}

/// OTP-required body in the success shape
pub fn otp_required_body() -> Value {
    json!({"requiresOtp": true, "userId": "42", "message": "OTP sent"})
}
