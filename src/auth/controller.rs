//! Auth Session Controller
//!
//! The state machine at the heart of the client: owns the current session,
//! drives login / OTP step-up / register / logout transitions, and is the
//! only writer to the session store. Keeping every mutation on this path is
//! what guarantees the in-memory phase and the persisted session never
//! diverge.
//!
//! # Phases
//!
//! - `Unauthenticated` - no session
//! - `OtpPending` - credentials accepted, waiting on a one-time passcode
//! - `Authenticated` - session held in memory and in the store
//!
//! A controller starts with `loading = true` until [`AuthController::init`]
//! has rehydrated from the store; guards treat that window as "defer", never
//! as logged-out.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::auth::api::{AuthApi, LoginOutcome, RegisterOutcome};
use crate::auth::store::SessionStore;
use crate::shared::config::AppConfig;
use crate::shared::error::AuthError;
use crate::shared::user::{Credentials, RegisterData, Session, UserRecord, UserUpdate};

/// An OTP step-up in flight. Exists only while a login is mid-flight;
/// discarded on success, exhaustion, expiry, or cancel.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
    pub ttl_seconds: i64,
    pub attempts_remaining: u32,
    last_sent: Instant,
}

impl OtpChallenge {
    fn new(user_id: String, ttl_seconds: i64, attempts: u32) -> Self {
        Self {
            user_id,
            issued_at: Utc::now(),
            ttl_seconds,
            attempts_remaining: attempts,
            last_sent: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() - self.issued_at > chrono::Duration::seconds(self.ttl_seconds)
    }

    fn cooldown_remaining(&self, cooldown: Duration) -> Duration {
        cooldown.saturating_sub(self.last_sent.elapsed())
    }
}

/// Authentication phase. The controller is always in exactly one of these.
#[derive(Debug, Clone)]
pub enum AuthPhase {
    Unauthenticated,
    OtpPending(OtpChallenge),
    Authenticated(Session),
}

/// What a successful `login` call produced
#[derive(Debug, Clone, PartialEq)]
pub enum LoginStatus {
    /// Session established and persisted
    LoggedIn,
    /// The backend wants an OTP; the controller is now `OtpPending`
    OtpSent { user_id: String, message: String },
}

/// Read-only snapshot for route guards and UI chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthView {
    /// Initialization or an operation is in flight; defer decisions
    pub loading: bool,
    pub logged_in: bool,
}

/// The session controller. One instance per client; inject it where the UI
/// needs it rather than reaching for globals.
#[derive(Debug)]
pub struct AuthController<S: SessionStore> {
    api: AuthApi,
    store: S,
    phase: AuthPhase,
    /// Credentials retained only while an OTP challenge is pending, so the
    /// resend path can re-submit them. Dropped with the challenge.
    pending_credentials: Option<Credentials>,
    loading: bool,
    initialized: bool,
    error: Option<String>,
    otp_cooldown: Duration,
    otp_ttl_seconds: i64,
    otp_max_attempts: u32,
}

impl<S: SessionStore> AuthController<S> {
    /// Create a controller. `loading` stays true until [`Self::init`] runs.
    pub fn new(config: &AppConfig, store: S) -> Self {
        Self {
            api: AuthApi::new(config),
            store,
            phase: AuthPhase::Unauthenticated,
            pending_credentials: None,
            loading: true,
            initialized: false,
            error: None,
            otp_cooldown: Duration::from_secs(config.otp_cooldown_secs),
            otp_ttl_seconds: config.otp_ttl_secs,
            otp_max_attempts: config.otp_max_attempts,
        }
    }

    /// Rehydrate the session from the store. Runs once; a second call is a
    /// no-op. A corrupt stored session reads as absent (the store heals
    /// itself) and a store I/O failure degrades to logged-out rather than
    /// blocking startup.
    pub async fn init(&mut self) {
        if self.initialized {
            return;
        }
        match self.store.load().await {
            Ok(Some(session)) => {
                info!(email = %session.user.email, "session restored from store");
                self.phase = AuthPhase::Authenticated(session);
            }
            Ok(None) => {
                debug!("no stored session");
                self.phase = AuthPhase::Unauthenticated;
            }
            Err(err) => {
                warn!(error = %err, "session store unavailable, starting logged out");
                self.phase = AuthPhase::Unauthenticated;
            }
        }
        self.initialized = true;
        self.loading = false;
    }

    /// Current phase
    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    /// The logged-in user, if any
    pub fn user(&self) -> Option<&UserRecord> {
        match &self.phase {
            AuthPhase::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.phase, AuthPhase::Authenticated(_))
    }

    /// True until initialization completes and during any in-flight operation
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Last surfaced error message, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Snapshot for route guards
    pub fn view(&self) -> AuthView {
        AuthView {
            loading: self.loading,
            logged_in: self.is_logged_in(),
        }
    }

    /// Seconds left before `resend_otp` does anything again; zero when no
    /// challenge is pending. Exposed for UI countdowns.
    pub fn otp_cooldown_remaining(&self) -> Duration {
        match &self.phase {
            AuthPhase::OtpPending(challenge) => challenge.cooldown_remaining(self.otp_cooldown),
            _ => Duration::ZERO,
        }
    }

    /// Log in with email and password, or complete a pending OTP challenge
    /// by passing the code.
    ///
    /// From `Unauthenticated`, an OTP-required reply moves to `OtpPending`
    /// without persisting anything. From `OtpPending`, a rejected code keeps
    /// the challenge (until attempts run out or it expires); a success
    /// persists the session and moves to `Authenticated`.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<LoginStatus, AuthError> {
        self.loading = true;
        self.error = None;
        let result = self.do_login(email, password, otp).await;
        self.loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn do_login(
        &mut self,
        email: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<LoginStatus, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::validation("email", "Email is required"));
        }
        if password.is_empty() {
            return Err(AuthError::validation("password", "Password is required"));
        }

        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        // Resolve the challenge context before going to the network
        let (user_id, challenge_expired) = match (&self.phase, otp) {
            (AuthPhase::OtpPending(challenge), Some(_)) => {
                (Some(challenge.user_id.clone()), challenge.is_expired())
            }
            (_, None) => (None, false),
            (_, Some(_)) => {
                return Err(AuthError::validation("otp", "No verification is pending"));
            }
        };
        if challenge_expired {
            self.drop_challenge();
            return Err(AuthError::application(
                "Verification code expired. Please log in again.",
            ));
        }

        let verifying = otp.is_some();
        match self.api.login(&credentials, otp, user_id.as_deref()).await {
            Ok(LoginOutcome::Success(session)) => {
                // Persist first: the store and the phase change together
                self.store.save(&session).await?;
                info!(email = %session.user.email, "login successful");
                self.phase = AuthPhase::Authenticated(session);
                self.pending_credentials = None;
                Ok(LoginStatus::LoggedIn)
            }
            Ok(LoginOutcome::OtpRequired { user_id, message }) => {
                debug!(user_id = %user_id, "OTP step-up required");
                self.phase = AuthPhase::OtpPending(OtpChallenge::new(
                    user_id.clone(),
                    self.otp_ttl_seconds,
                    self.otp_max_attempts,
                ));
                self.pending_credentials = Some(credentials);
                Ok(LoginStatus::OtpSent { user_id, message })
            }
            Err(err) => {
                // Only a backend rejection burns an attempt; a transport
                // failure never reached the backend, so the challenge stays
                // untouched and the error keeps its kind for retry gating
                if verifying && matches!(err, AuthError::Application { .. }) {
                    let exhausted =
                        if let AuthPhase::OtpPending(challenge) = &mut self.phase {
                            challenge.attempts_remaining =
                                challenge.attempts_remaining.saturating_sub(1);
                            challenge.attempts_remaining == 0
                        } else {
                            false
                        };
                    if exhausted {
                        warn!("OTP attempts exhausted, discarding challenge");
                        self.drop_challenge();
                        return Err(AuthError::application(
                            "Too many failed attempts. Please log in again.",
                        ));
                    }
                }
                Err(err)
            }
        }
    }

    /// Ask the backend to re-send the pending OTP. A no-op while the
    /// cooldown window is open; at most one network call per window.
    pub async fn resend_otp(&mut self) -> Result<(), AuthError> {
        self.loading = true;
        self.error = None;
        let result = self.do_resend_otp().await;
        self.loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn do_resend_otp(&mut self) -> Result<(), AuthError> {
        let (user_id, credentials) = match (&self.phase, &self.pending_credentials) {
            (AuthPhase::OtpPending(challenge), Some(creds)) => {
                if challenge.cooldown_remaining(self.otp_cooldown) > Duration::ZERO {
                    debug!("OTP resend suppressed by cooldown");
                    return Ok(());
                }
                (challenge.user_id.clone(), creds.clone())
            }
            _ => {
                return Err(AuthError::validation("otp", "No verification is pending"));
            }
        };

        match self.api.resend_otp(&credentials, &user_id).await {
            Ok(LoginOutcome::OtpRequired { user_id, .. }) => {
                if let AuthPhase::OtpPending(challenge) = &mut self.phase {
                    challenge.user_id = user_id;
                    challenge.issued_at = Utc::now();
                    challenge.last_sent = Instant::now();
                }
                Ok(())
            }
            // A resend that comes back as a full session is accepted as-is
            Ok(LoginOutcome::Success(session)) => {
                self.store.save(&session).await?;
                self.phase = AuthPhase::Authenticated(session);
                self.pending_credentials = None;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Abandon a pending OTP challenge and return to logged-out
    pub fn cancel_otp(&mut self) {
        if matches!(self.phase, AuthPhase::OtpPending(_)) {
            debug!("OTP challenge cancelled");
            self.drop_challenge();
        }
    }

    fn drop_challenge(&mut self) {
        self.phase = AuthPhase::Unauthenticated;
        self.pending_credentials = None;
    }

    /// Register a new account. Never changes the authentication phase; the
    /// outcome mirrors login's success / OTP-required / failure split.
    pub async fn register(&mut self, data: RegisterData) -> Result<RegisterOutcome, AuthError> {
        self.loading = true;
        self.error = None;
        let result = self.do_register(data).await;
        self.loading = false;
        if let Err(err) = &result {
            self.error = Some(err.to_string());
        }
        result
    }

    async fn do_register(&mut self, data: RegisterData) -> Result<RegisterOutcome, AuthError> {
        if data.email.trim().is_empty() {
            return Err(AuthError::validation("email", "Email is required"));
        }
        if data.password.is_empty() {
            return Err(AuthError::validation("password", "Password is required"));
        }
        if data.password.len() < 6 {
            return Err(AuthError::validation(
                "password",
                "Password must be at least 6 characters",
            ));
        }
        self.api.register(&data).await
    }

    /// Log out: clear the store and the in-memory session, from any phase.
    /// Memory is reset even if the store clear fails, so the user is never
    /// stuck logged in.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        info!("logging out");
        let result = self.store.clear().await;
        self.phase = AuthPhase::Unauthenticated;
        self.pending_credentials = None;
        self.error = None;
        result
    }

    /// Merge a partial update into the logged-in user and re-persist the
    /// session atomically. The store is written before memory so a failed
    /// write leaves both sides on the old record.
    pub async fn update_user(&mut self, update: UserUpdate) -> Result<UserRecord, AuthError> {
        let session = match &mut self.phase {
            AuthPhase::Authenticated(session) => session,
            _ => {
                return Err(AuthError::validation("session", "Not logged in"));
            }
        };

        let merged = Session {
            token: session.token.clone(),
            user: session.user.merged(&update),
        };
        self.store.save(&merged).await?;
        *session = merged;
        debug!("user record updated");
        Ok(session.user.clone())
    }
}
