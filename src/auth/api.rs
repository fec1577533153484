/**
 * Auth API Client
 *
 * Stateless HTTP boundary to the identity backend. Collapses the backend's
 * heterogeneous signaling into exactly one outcome per call: the OTP
 * requirement may arrive on a 2xx body or on an error-status body carrying
 * the same fields, and callers never see the difference.
 */

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::shared::config::AppConfig;
use crate::shared::error::AuthError;
use crate::shared::user::{Credentials, RegisterData, Session, UserRecord};

/// Normalized outcome of a login or OTP-verify call.
///
/// Failures are `Err(AuthError)`, with `Application` and `Transport` kept
/// distinct so the UI can offer a retry on the latter.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Fully authenticated; the session is ready to persist
    Success(Session),
    /// The backend wants an OTP step-up before issuing a session
    OtpRequired { user_id: String, message: String },
}

/// Normalized outcome of a registration call
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOutcome {
    pub message: String,
    /// Whether the new account must complete an OTP step on first login
    pub requires_otp: bool,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    otp: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resend_otp: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mobile: Option<&'a str>,
}

/// Raw login reply. Every field is optional: the backend mixes success,
/// OTP-required, and error shapes on both 2xx and error statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LoginReply {
    token: Option<String>,
    user: Option<UserRecord>,
    requires_otp: Option<bool>,
    status: Option<String>,
    user_id: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RegisterReply {
    message: Option<String>,
    requires_otp: Option<bool>,
    user_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MessageReply {
    message: Option<String>,
    error: Option<String>,
}

/// HTTP client for the identity backend
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Client,
    config: AppConfig,
}

impl AuthApi {
    /// Create a client from the configured Auth API base URL
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            config: config.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        self.config.api_url(path)
    }

    /// Log in with credentials, optionally completing an OTP challenge.
    ///
    /// `user_id` is required alongside `otp` so the backend can match the
    /// verification to the challenge it issued.
    pub async fn login(
        &self,
        credentials: &Credentials,
        otp: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<LoginOutcome, AuthError> {
        debug!(
            email = %credentials.email,
            has_otp = otp.is_some(),
            "sending login request"
        );

        let request = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
            otp,
            user_id,
            resend_otp: None,
        };
        let (ok, reply) = self.post_login(&request).await?;
        normalize_login(ok, reply, user_id)
    }

    /// Ask the backend to re-issue the OTP for a pending challenge
    pub async fn resend_otp(
        &self,
        credentials: &Credentials,
        user_id: &str,
    ) -> Result<LoginOutcome, AuthError> {
        debug!(user_id = %user_id, "requesting OTP re-issue");

        let request = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
            otp: None,
            user_id: Some(user_id),
            resend_otp: Some(true),
        };
        let (ok, reply) = self.post_login(&request).await?;
        normalize_login(ok, reply, Some(user_id))
    }

    async fn post_login(
        &self,
        request: &LoginRequest<'_>,
    ) -> Result<(bool, LoginReply), AuthError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(request)
            .send()
            .await
            .map_err(|err| {
                debug!(error = %err, "no response from auth backend");
                AuthError::transport()
            })?;

        let ok = response.status().is_success();
        let body = response.text().await.map_err(|_| AuthError::transport())?;
        // Error-status bodies are not guaranteed to be JSON
        let reply: LoginReply = serde_json::from_str(&body).unwrap_or_default();
        Ok((ok, reply))
    }

    /// Register a new account. Never logs the user in; an OTP requirement on
    /// the reply applies to the account's first login.
    pub async fn register(&self, data: &RegisterData) -> Result<RegisterOutcome, AuthError> {
        debug!(email = %data.email, "sending register request");

        let request = RegisterRequest {
            name: &data.name,
            email: &data.email,
            password: &data.password,
            mobile: data.mobile.as_deref(),
        };
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&request)
            .send()
            .await
            .map_err(|_| AuthError::transport())?;

        let ok = response.status().is_success();
        let body = response.text().await.map_err(|_| AuthError::transport())?;
        let reply: RegisterReply = serde_json::from_str(&body).unwrap_or_default();

        if !ok || reply.error.is_some() {
            let message = reply
                .message
                .or(reply.error)
                .unwrap_or_else(|| "Registration failed. Please try again.".to_string());
            return Err(AuthError::application(message));
        }

        Ok(RegisterOutcome {
            message: reply
                .message
                .unwrap_or_else(|| "Registration successful".to_string()),
            requires_otp: reply.requires_otp.unwrap_or(false),
            user_id: reply.user_id,
        })
    }

    /// Request a password-reset email
    pub async fn forgot_password(&self, email: &str) -> Result<String, AuthError> {
        self.post_message(
            "/api/auth/forgot-password",
            &ForgotPasswordRequest { email },
            "Failed to process password reset",
        )
        .await
    }

    /// Complete a password reset with the emailed token
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<String, AuthError> {
        self.post_message(
            "/api/auth/reset-password",
            &ResetPasswordRequest { token, new_password },
            "Failed to reset password",
        )
        .await
    }

    async fn post_message<T: Serialize>(
        &self,
        path: &str,
        request: &T,
        fallback: &str,
    ) -> Result<String, AuthError> {
        let response = self
            .client
            .post(self.url(path))
            .json(request)
            .send()
            .await
            .map_err(|_| AuthError::transport())?;

        let ok = response.status().is_success();
        let body = response.text().await.map_err(|_| AuthError::transport())?;
        let reply: MessageReply = serde_json::from_str(&body).unwrap_or_default();

        if !ok || reply.error.is_some() {
            let message = reply
                .message
                .or(reply.error)
                .unwrap_or_else(|| fallback.to_string());
            return Err(AuthError::application(message));
        }
        Ok(reply.message.unwrap_or_else(|| fallback.to_string()))
    }
}

/// Collapse a raw login reply into one outcome.
///
/// Precedence: an OTP requirement wins over the error shape (the backend
/// signals it both ways), then a complete token+user pair, then failure. A
/// 2xx reply missing either half of the session is `InvalidResponse`, never
/// a partial success.
fn normalize_login(
    ok: bool,
    reply: LoginReply,
    fallback_user_id: Option<&str>,
) -> Result<LoginOutcome, AuthError> {
    let otp_required = reply.requires_otp.unwrap_or(false)
        || reply.status.as_deref() == Some("otp_required");

    if otp_required {
        let user_id = reply
            .user_id
            .or_else(|| fallback_user_id.map(str::to_string))
            .ok_or(AuthError::InvalidResponse)?;
        let message = reply
            .message
            .unwrap_or_else(|| "OTP required".to_string());
        return Ok(LoginOutcome::OtpRequired { user_id, message });
    }

    if !ok || reply.error.is_some() {
        let message = reply
            .message
            .or(reply.error)
            .unwrap_or_else(|| "Failed to login. Please try again.".to_string());
        return Err(AuthError::application(message));
    }

    match (reply.token, reply.user) {
        (Some(token), Some(user)) => Ok(LoginOutcome::Success(Session { token, user })),
        _ => Err(AuthError::InvalidResponse),
    }
}
