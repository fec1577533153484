//! Shopfront - Auth/Session Core
//!
//! The authentication and session layer of the storefront client. Page
//! rendering, catalog, cart, and order views live in the UI layer and
//! consume this crate through [`auth::AuthController`] and the route guards.
//!
//! # Overview
//!
//! - Credential login with an optional one-time-passcode (OTP) step-up
//! - Durable sessions that survive restarts, stored in SQLite
//! - Route guards for protected and guest-only pages
//!
//! # Module Structure
//!
//! - **`shared`** - Configuration, error taxonomy, user/session types
//! - **`auth`** - Auth API client, session store, controller, route guards
//!
//! # Usage
//!
//! ```rust,no_run
//! use shopfront::auth::{AuthController, SqliteSessionStore};
//! use shopfront::shared::AppConfig;
//!
//! # async fn example() -> Result<(), shopfront::shared::AuthError> {
//! let config = AppConfig::builder()
//!     .server_url("https://shop.example.com")
//!     .build()
//!     .expect("valid config");
//!
//! let store = SqliteSessionStore::open_default().await?;
//! let mut auth = AuthController::new(&config, store);
//! auth.init().await;
//!
//! if auth.is_logged_in() {
//!     println!("welcome back, {}", auth.user().unwrap().email);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns `Result<T, AuthError>`; see
//! [`shared::error`] for the taxonomy. Corrupt persisted sessions are not
//! errors: the store self-heals and the controller starts logged out.

/// Shared types and configuration
pub mod shared;

/// Authentication and session management
pub mod auth;
